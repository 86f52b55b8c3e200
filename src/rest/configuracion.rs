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

//! APIs to manage the key/value configuration settings of the clinic.

use crate::driver::Driver;
use crate::model::Configuracion;
use crate::rest::{
    campo_texto, campo_texto_opcional, errores_de_validacion, EmptyBody, RestResult,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Maximum length of setting keys per the schema.
const MAX_CLAVE_LENGTH: usize = 100;

/// Maximum length of setting values and descriptions per the schema.
const MAX_VALOR_LENGTH: usize = 255;

/// Loosely-typed body of the setting creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearConfiguracionRequest {
    /// Key of the setting.
    clave: Option<String>,

    /// Value of the setting.
    valor: Option<String>,

    /// Optional human-readable description of the setting.
    descripcion: Option<String>,
}

impl CrearConfiguracionRequest {
    /// Validates all fields at once, reporting every problem found.
    fn validar(self) -> RestResult<(String, String, Option<String>)> {
        let mut errores = vec![];

        let clave = campo_texto(&mut errores, "clave", self.clave.as_deref(), MAX_CLAVE_LENGTH);
        let valor = campo_texto(&mut errores, "valor", self.valor.as_deref(), MAX_VALOR_LENGTH);
        let descripcion = campo_texto_opcional(
            &mut errores,
            "descripcion",
            self.descripcion.as_deref(),
            MAX_VALOR_LENGTH,
        );

        match (clave, valor) {
            (Some(clave), Some(valor)) if errores.is_empty() => Ok((clave, valor, descripcion)),
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the setting update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarConfiguracionRequest {
    /// New value of the setting, if any.
    valor: Option<String>,

    /// New description of the setting, if any.
    descripcion: Option<String>,
}

impl ActualizarConfiguracionRequest {
    /// Validates the fields that were supplied, reporting every problem found.
    fn validar(self) -> RestResult<(Option<String>, Option<String>)> {
        let mut errores = vec![];

        let valor =
            campo_texto_opcional(&mut errores, "valor", self.valor.as_deref(), MAX_VALOR_LENGTH);
        let descripcion = campo_texto_opcional(
            &mut errores,
            "descripcion",
            self.descripcion.as_deref(),
            MAX_VALOR_LENGTH,
        );

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok((valor, descripcion))
    }
}

/// API handler to list all settings.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Configuracion>>> {
    Ok(Json(driver.find_configuraciones().await?))
}

/// API handler to create a setting.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearConfiguracionRequest>,
) -> RestResult<(http::StatusCode, Json<Configuracion>)> {
    let (clave, valor, descripcion) = request.validar()?;
    let config = driver.crear_configuracion(clave, valor, descripcion).await?;
    Ok((http::StatusCode::CREATED, Json(config)))
}

/// API handler to fetch one setting by its key.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(clave): Path<String>,
    _body: EmptyBody,
) -> RestResult<Json<Configuracion>> {
    Ok(Json(driver.find_configuracion(&clave).await?))
}

/// API handler to partially update a setting.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(clave): Path<String>,
    Json(request): Json<ActualizarConfiguracionRequest>,
) -> RestResult<Json<Configuracion>> {
    let (valor, descripcion) = request.validar()?;
    Ok(Json(driver.actualizar_configuracion(&clave, valor, descripcion).await?))
}

/// API handler to delete one setting.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(clave): Path<String>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_configuracion(&clave).await?;
    Ok(http::StatusCode::NO_CONTENT)
}
