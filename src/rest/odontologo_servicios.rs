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

//! APIs to manage the associations between dentists and the treatments they can perform.

use crate::driver::Driver;
use crate::model::{OdontologoServicio, OdontologoServicioDetalle, Tratamiento, TratamientoResumen};
use crate::rest::{campo_requerido, errores_de_validacion, EmptyBody, RestResult};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the association creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearOdontologoServicioRequest {
    /// Dentist to associate.
    odontologo_id: Option<i64>,

    /// Treatment to associate.
    tratamiento_id: Option<i64>,
}

impl CrearOdontologoServicioRequest {
    /// Checks that both references were supplied.
    fn validar(self) -> RestResult<(i64, i64)> {
        let mut errores = vec![];
        let odontologo_id = campo_requerido(&mut errores, "odontologo_id", self.odontologo_id);
        let tratamiento_id = campo_requerido(&mut errores, "tratamiento_id", self.tratamiento_id);

        match (odontologo_id, tratamiento_id) {
            (Some(odontologo_id), Some(tratamiento_id)) => Ok((odontologo_id, tratamiento_id)),
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the association update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarOdontologoServicioRequest {
    /// Replacement treatment, if any.
    tratamiento_id: Option<i64>,
}

/// API handler to list all active associations with their referenced entities.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<OdontologoServicioDetalle>>> {
    Ok(Json(driver.find_odontologo_servicios().await?))
}

/// API handler to associate a treatment with a dentist.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearOdontologoServicioRequest>,
) -> RestResult<(http::StatusCode, Json<OdontologoServicio>)> {
    let (odontologo_id, tratamiento_id) = request.validar()?;
    let servicio = driver.crear_odontologo_servicio(odontologo_id, tratamiento_id).await?;
    Ok((http::StatusCode::CREATED, Json(servicio)))
}

/// API handler to fetch one association.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<OdontologoServicio>> {
    Ok(Json(driver.find_odontologo_servicio(id).await?))
}

/// API handler to replace the treatment referenced by an association.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarOdontologoServicioRequest>,
) -> RestResult<Json<OdontologoServicio>> {
    Ok(Json(driver.actualizar_odontologo_servicio(id, request.tratamiento_id).await?))
}

/// API handler to soft-delete one association.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_odontologo_servicio(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

/// API handler to list the treatments associated with a dentist.
pub(crate) async fn by_odontologo_handler(
    State(driver): State<Driver>,
    Path(odontologo_id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<TratamientoResumen>>> {
    Ok(Json(driver.find_servicios_de_odontologo(odontologo_id).await?))
}

/// API handler to list the treatments *not* yet associated with a dentist.
pub(crate) async fn disponibles_handler(
    State(driver): State<Driver>,
    Path(odontologo_id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Tratamiento>>> {
    Ok(Json(driver.find_servicios_disponibles(odontologo_id).await?))
}

/// API handler to remove the association identified by its natural pair.
pub(crate) async fn delete_relacion_handler(
    State(driver): State<Driver>,
    Path((odontologo_id, tratamiento_id)): Path<(i64, i64)>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_relacion(odontologo_id, tratamiento_id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}
