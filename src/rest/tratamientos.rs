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

//! APIs to manage the treatments offered by the clinic.

use crate::driver::Driver;
use crate::model::{
    duracion_valida, precio_valido, ActualizacionTratamiento, NuevoTratamiento, Tratamiento,
};
use crate::rest::{
    campo_texto, campo_texto_opcional, errores_de_validacion, falta, valida, EmptyBody,
    RestResult,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the treatment creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearTratamientoRequest {
    /// Short name.
    nombre: Option<String>,

    /// Description, unique among active treatments.
    descripcion: Option<String>,

    /// Price.
    precio: Option<f64>,

    /// Duration in minutes.
    duracion: Option<i32>,
}

impl CrearTratamientoRequest {
    /// Checks all fields against the domain rules, reporting every problem at once.
    fn validar(self) -> RestResult<NuevoTratamiento> {
        let mut errores = vec![];
        let nombre = campo_texto(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let descripcion = campo_texto(&mut errores, "descripcion", self.descripcion.as_deref(), 100);
        let precio = match self.precio {
            Some(precio) => valida(&mut errores, "precio", precio_valido(precio)),
            None => falta(&mut errores, "precio"),
        };
        let duracion = match self.duracion {
            Some(duracion) => {
                valida(&mut errores, "duracion", duracion_valida(duracion))
            }
            None => falta(&mut errores, "duracion"),
        };

        match (nombre, descripcion, precio, duracion) {
            (Some(nombre), Some(descripcion), Some(precio), Some(duracion))
                if errores.is_empty() =>
            {
                Ok(NuevoTratamiento { nombre, descripcion, precio, duracion })
            }
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the treatment update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarTratamientoRequest {
    /// New name, if any.
    nombre: Option<String>,

    /// New description, if any.
    descripcion: Option<String>,

    /// New price, if any.
    precio: Option<f64>,

    /// New duration in minutes, if any.
    duracion: Option<i32>,
}

impl ActualizarTratamientoRequest {
    /// Checks the supplied fields against the domain rules.
    fn validar(self) -> RestResult<ActualizacionTratamiento> {
        let mut errores = vec![];
        let nombre = campo_texto_opcional(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let descripcion =
            campo_texto_opcional(&mut errores, "descripcion", self.descripcion.as_deref(), 100);
        let precio =
            self.precio.and_then(|precio| valida(&mut errores, "precio", precio_valido(precio)));
        let duracion = self.duracion.and_then(|duracion| {
            valida(&mut errores, "duracion", duracion_valida(duracion))
        });

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok(ActualizacionTratamiento { nombre, descripcion, precio, duracion })
    }
}

/// API handler to list all active treatments.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Tratamiento>>> {
    Ok(Json(driver.find_tratamientos().await?))
}

/// API handler to create a treatment.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearTratamientoRequest>,
) -> RestResult<(http::StatusCode, Json<Tratamiento>)> {
    let datos = request.validar()?;
    let tratamiento = driver.crear_tratamiento(datos).await?;
    Ok((http::StatusCode::CREATED, Json(tratamiento)))
}

/// API handler to fetch one treatment.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Tratamiento>> {
    Ok(Json(driver.find_tratamiento(id).await?))
}

/// API handler to apply a partial update to a treatment.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarTratamientoRequest>,
) -> RestResult<Json<Tratamiento>> {
    let cambios = request.validar()?;
    Ok(Json(driver.actualizar_tratamiento(id, cambios).await?))
}

/// API handler to soft-delete a treatment.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_tratamiento(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}
