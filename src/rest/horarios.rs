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

//! APIs to manage the weekly schedules of dentists.

use crate::driver::Driver;
use crate::model::{dia_semana_valido, ActualizacionHorario, Horario, NuevoHorario};
use crate::rest::{
    campo_hora, campo_hora_opcional, campo_requerido, errores_de_validacion, valida, EmptyBody,
    RestResult,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the schedule creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearHorarioRequest {
    /// Dentist the schedule belongs to.
    odontologo_id: Option<i64>,

    /// Day of the week, with 0 being Sunday and 6 being Saturday.
    dia_semana: Option<i16>,

    /// Start of the attendance slot as `HH:MM`.
    hora_inicio: Option<String>,

    /// End of the attendance slot as `HH:MM`.
    hora_fin: Option<String>,
}

impl CrearHorarioRequest {
    /// Validates all fields at once, reporting every problem found.
    fn validar(self) -> RestResult<NuevoHorario> {
        let mut errores = vec![];

        let odontologo_id = campo_requerido(&mut errores, "odontologo_id", self.odontologo_id);
        let dia_semana = match self.dia_semana {
            Some(dia) => valida(&mut errores, "dia_semana", dia_semana_valido(dia)),
            None => campo_requerido(&mut errores, "dia_semana", None),
        };
        let hora_inicio = campo_hora(&mut errores, "hora_inicio", self.hora_inicio.as_deref());
        let hora_fin = campo_hora(&mut errores, "hora_fin", self.hora_fin.as_deref());

        match (odontologo_id, dia_semana, hora_inicio, hora_fin) {
            (Some(odontologo_id), Some(dia_semana), Some(hora_inicio), Some(hora_fin))
                if errores.is_empty() =>
            {
                Ok(NuevoHorario { odontologo_id, dia_semana, hora_inicio, hora_fin })
            }
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the schedule update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarHorarioRequest {
    /// New day of the week, if any.
    dia_semana: Option<i16>,

    /// New start of the slot, if any.
    hora_inicio: Option<String>,

    /// New end of the slot, if any.
    hora_fin: Option<String>,
}

impl ActualizarHorarioRequest {
    /// Validates the fields that were supplied, reporting every problem found.
    fn validar(self) -> RestResult<ActualizacionHorario> {
        let mut errores = vec![];

        let dia_semana = self
            .dia_semana
            .and_then(|dia| valida(&mut errores, "dia_semana", dia_semana_valido(dia)));
        let hora_inicio =
            campo_hora_opcional(&mut errores, "hora_inicio", self.hora_inicio.as_deref());
        let hora_fin = campo_hora_opcional(&mut errores, "hora_fin", self.hora_fin.as_deref());

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok(ActualizacionHorario { dia_semana, hora_inicio, hora_fin })
    }
}

/// API handler to list all active schedule entries.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Horario>>> {
    Ok(Json(driver.find_horarios().await?))
}

/// API handler to create a schedule entry.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearHorarioRequest>,
) -> RestResult<(http::StatusCode, Json<Horario>)> {
    let datos = request.validar()?;
    let horario = driver.crear_horario(datos).await?;
    Ok((http::StatusCode::CREATED, Json(horario)))
}

/// API handler to fetch one schedule entry.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Horario>> {
    Ok(Json(driver.find_horario(id).await?))
}

/// API handler to partially update a schedule entry.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarHorarioRequest>,
) -> RestResult<Json<Horario>> {
    let cambios = request.validar()?;
    Ok(Json(driver.actualizar_horario(id, cambios).await?))
}

/// API handler to soft-delete one schedule entry.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_horario(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

/// API handler to list the schedule entries of a dentist.
pub(crate) async fn by_odontologo_handler(
    State(driver): State<Driver>,
    Path(odontologo_id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Horario>>> {
    Ok(Json(driver.find_horarios_de_odontologo(odontologo_id).await?))
}
