// Clínica Dental
// Copyright 2025 The Clínica Dental Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! APIs to manage appointments.

use crate::driver::Driver;
use crate::model::{texto_opcional, ActualizacionCita, Cita, NuevaCita};
use crate::rest::{
    campo_fecha, campo_fecha_opcional, campo_hora, campo_hora_opcional, campo_requerido,
    campo_texto, campo_texto_opcional, errores_de_validacion, valida, EmptyBody, RestResult,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the appointment creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearCitaRequest {
    /// Patient attending the appointment.
    id_paciente: Option<i64>,

    /// Dentist serving the appointment.
    id_odontologo: Option<i64>,

    /// Treatment to perform.
    id_tratamiento: Option<i64>,

    /// Scheduled date as `YYYY-MM-DD`.
    fecha: Option<String>,

    /// Scheduled time as `HH:MM`.
    hora: Option<String>,

    /// Status of the appointment.
    estado: Option<String>,

    /// Optional reason for the visit.
    motivo: Option<String>,
}

impl CrearCitaRequest {
    /// Checks all fields against the domain rules, reporting every problem at once.
    fn validar(self) -> RestResult<NuevaCita> {
        let mut errores = vec![];
        let id_paciente = campo_requerido(&mut errores, "id_paciente", self.id_paciente);
        let id_odontologo = campo_requerido(&mut errores, "id_odontologo", self.id_odontologo);
        let id_tratamiento = campo_requerido(&mut errores, "id_tratamiento", self.id_tratamiento);
        let fecha = campo_fecha(&mut errores, "fecha", self.fecha.as_deref());
        let hora = campo_hora(&mut errores, "hora", self.hora.as_deref());
        let estado = campo_texto(&mut errores, "estado", self.estado.as_deref(), 20);
        let motivo = match self.motivo.as_deref() {
            Some(motivo) => valida(&mut errores, "motivo", texto_opcional(motivo, 255)).flatten(),
            None => None,
        };

        match (id_paciente, id_odontologo, id_tratamiento, fecha, hora, estado) {
            (
                Some(id_paciente),
                Some(id_odontologo),
                Some(id_tratamiento),
                Some(fecha),
                Some(hora),
                Some(estado),
            ) if errores.is_empty() => Ok(NuevaCita {
                id_paciente,
                id_odontologo,
                id_tratamiento,
                fecha,
                hora,
                estado,
                motivo,
            }),
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the appointment update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarCitaRequest {
    /// New patient, if any.
    id_paciente: Option<i64>,

    /// New dentist, if any.
    id_odontologo: Option<i64>,

    /// New treatment, if any.
    id_tratamiento: Option<i64>,

    /// New date as `YYYY-MM-DD`, if any.
    fecha: Option<String>,

    /// New time as `HH:MM`, if any.
    hora: Option<String>,

    /// New status, if any.
    estado: Option<String>,

    /// New reason, if any.
    motivo: Option<String>,
}

impl ActualizarCitaRequest {
    /// Checks the supplied fields against the domain rules.
    fn validar(self) -> RestResult<ActualizacionCita> {
        let mut errores = vec![];
        let fecha = campo_fecha_opcional(&mut errores, "fecha", self.fecha.as_deref());
        let hora = campo_hora_opcional(&mut errores, "hora", self.hora.as_deref());
        let estado = campo_texto_opcional(&mut errores, "estado", self.estado.as_deref(), 20);
        let motivo = self
            .motivo
            .as_deref()
            .and_then(|motivo| valida(&mut errores, "motivo", texto_opcional(motivo, 255)))
            .flatten();

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok(ActualizacionCita {
            id_paciente: self.id_paciente,
            id_odontologo: self.id_odontologo,
            id_tratamiento: self.id_tratamiento,
            fecha,
            hora,
            estado,
            motivo,
        })
    }
}

/// API handler to list all active appointments.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Cita>>> {
    Ok(Json(driver.find_citas().await?))
}

/// API handler to create an appointment.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearCitaRequest>,
) -> RestResult<(http::StatusCode, Json<Cita>)> {
    let datos = request.validar()?;
    let cita = driver.crear_cita(datos).await?;
    Ok((http::StatusCode::CREATED, Json(cita)))
}

/// API handler to fetch one appointment.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Cita>> {
    Ok(Json(driver.find_cita(id).await?))
}

/// API handler to apply a partial update to an appointment.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarCitaRequest>,
) -> RestResult<Json<Cita>> {
    let cambios = request.validar()?;
    Ok(Json(driver.actualizar_cita(id, cambios).await?))
}

/// API handler to soft-delete an appointment.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_cita(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}
