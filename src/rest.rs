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

//! Entry point to the REST server.
//!
//! Every resource is served from its own `.rs` file under `/api/v1`.  Request
//! bodies arrive as loosely-typed structs whose fields are all optional; a
//! `validar` method checks them against the domain rules and accumulates the
//! problems of every field before reporting them all at once.

use crate::driver::{Driver, DriverError};
use crate::model::{FieldError, ModelError, ModelResult};
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AsHeaderName;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

mod citas;
mod configuracion;
mod horarios;
mod odontologo_servicios;
mod odontologos;
mod pacientes;
mod roles;
#[cfg(test)]
mod testutils;
mod tratamientos;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Indicates a uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// Indicates an authentication problem.
    #[error("{0}")]
    Unauthorized(String),
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(_) => RestError::Conflict(e.to_string()),
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
            DriverError::Unauthorized(_) => RestError::Unauthorized(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::Conflict(_) => http::StatusCode::CONFLICT,
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
            RestError::Unauthorized(_) => http::StatusCode::UNAUTHORIZED,
        };

        let response = ErrorResponse { message: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that
/// we don't care about.  This future-proofs the service.
pub(crate) struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Name of the header that carries the identity of the authenticated caller, installed by the
/// authenticating front-end that sits before this service.
const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the authenticated caller, as extracted from the `x-user-id` header.
pub(crate) struct UsuarioAutenticado(pub(crate) i64);

#[async_trait]
impl<S> FromRequestParts<S> for UsuarioAutenticado
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = get_unique_header(&parts.headers, USER_ID_HEADER)?.ok_or_else(|| {
            RestError::Unauthorized(format!("Falta la cabecera {}", USER_ID_HEADER))
        })?;
        let id = value
            .to_str()
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| {
                RestError::Unauthorized(format!(
                    "La cabecera {} no es un identificador válido",
                    USER_ID_HEADER
                ))
            })?;
        Ok(UsuarioAutenticado(id))
    }
}

/// Extracts the header `name` from `headers` and ensures it has at most one value.
fn get_unique_header<K: AsHeaderName + Copy>(
    headers: &HeaderMap,
    name: K,
) -> RestResult<Option<&HeaderValue>> {
    let mut iter = headers.get_all(name).iter();
    let value = iter.next();
    if iter.next().is_some() {
        return Err(RestError::InvalidRequest(format!(
            "Header {} cannot have more than one value",
            name.as_str()
        )));
    }
    Ok(value)
}

/// Body of the password change requests shared by patients and dentists.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Default, Serialize))]
pub(crate) struct CambiarPasswordRequest {
    /// Current password, needed to authorize the change.
    password_actual: Option<String>,

    /// Password to store in its place.
    nueva_password: Option<String>,
}

impl CambiarPasswordRequest {
    /// Checks that both passwords were supplied and are within limits.
    fn validar(self) -> RestResult<(crate::model::Password, crate::model::Password)> {
        use crate::model::Password;

        let mut errores = vec![];
        let actual = match self.password_actual.as_deref() {
            Some(password) => valida(&mut errores, "passwordActual", Password::new(password)),
            None => falta(&mut errores, "passwordActual"),
        };
        let nueva = match self.nueva_password.as_deref() {
            Some(password) => valida(&mut errores, "nuevaPassword", Password::new(password)),
            None => falta(&mut errores, "nuevaPassword"),
        };

        match (actual, nueva) {
            (Some(actual), Some(nueva)) if errores.is_empty() => Ok((actual, nueva)),
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Validates a required free-form text field, accumulating problems in `errores`.
fn campo_texto(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
    max: usize,
) -> Option<String> {
    match valor {
        Some(valor) => valida(errores, campo, crate::model::texto_obligatorio(valor, max)),
        None => falta(errores, campo),
    }
}

/// Validates a free-form text field of a partial update: an absent field is left alone but a
/// present one must pass the same checks as on creation.
fn campo_texto_opcional(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
    max: usize,
) -> Option<String> {
    valor.and_then(|valor| valida(errores, campo, crate::model::texto_obligatorio(valor, max)))
}

/// Validates a required `YYYY-MM-DD` date field, accumulating problems in `errores`.
fn campo_fecha(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
) -> Option<time::Date> {
    match valor {
        Some(valor) => valida(errores, campo, crate::model::parse_fecha(valor)),
        None => falta(errores, campo),
    }
}

/// Validates a `YYYY-MM-DD` date field of a partial update.
fn campo_fecha_opcional(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
) -> Option<time::Date> {
    valor.and_then(|valor| valida(errores, campo, crate::model::parse_fecha(valor)))
}

/// Validates a required `HH:MM` time field, accumulating problems in `errores`.
fn campo_hora(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
) -> Option<time::Time> {
    match valor {
        Some(valor) => valida(errores, campo, crate::model::parse_hora(valor)),
        None => falta(errores, campo),
    }
}

/// Validates an `HH:MM` time field of a partial update.
fn campo_hora_opcional(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<&str>,
) -> Option<time::Time> {
    valor.and_then(|valor| valida(errores, campo, crate::model::parse_hora(valor)))
}

/// Validates a required field that has no textual representation, such as a numeric id.
fn campo_requerido<T>(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    valor: Option<T>,
) -> Option<T> {
    match valor {
        Some(valor) => Some(valor),
        None => falta(errores, campo),
    }
}

/// Records the result of validating the field `campo`, accumulating problems in `errores`.
fn valida<T>(
    errores: &mut Vec<FieldError>,
    campo: &'static str,
    resultado: ModelResult<T>,
) -> Option<T> {
    match resultado {
        Ok(valor) => Some(valor),
        Err(e) => {
            errores.push(FieldError { campo, mensaje: e.0 });
            None
        }
    }
}

/// Records that the required field `campo` was missing from the request.
fn falta<T>(errores: &mut Vec<FieldError>, campo: &'static str) -> Option<T> {
    errores.push(FieldError { campo, mensaje: "es obligatorio".to_owned() });
    None
}

/// Converts the accumulated per-field validation `errores` into a single request error.
fn errores_de_validacion(errores: Vec<FieldError>) -> RestError {
    debug_assert!(!errores.is_empty());
    let mensajes = errores.iter().map(FieldError::to_string).collect::<Vec<String>>();
    RestError::InvalidRequest(mensajes.join("; "))
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::{delete, get, post};
    Router::new()
        .route("/api/v1/citas", get(citas::list_handler).post(citas::create_handler))
        .route(
            "/api/v1/citas/:id",
            get(citas::get_handler)
                .patch(citas::update_handler)
                .delete(citas::delete_handler),
        )
        .route(
            "/api/v1/configuracion",
            get(configuracion::list_handler).post(configuracion::create_handler),
        )
        .route(
            "/api/v1/configuracion/:clave",
            get(configuracion::get_handler)
                .patch(configuracion::update_handler)
                .delete(configuracion::delete_handler),
        )
        .route("/api/v1/horarios", get(horarios::list_handler).post(horarios::create_handler))
        .route(
            "/api/v1/horarios/:id",
            get(horarios::get_handler)
                .patch(horarios::update_handler)
                .delete(horarios::delete_handler),
        )
        .route(
            "/api/v1/horarios/odontologo/:odontologo_id",
            get(horarios::by_odontologo_handler),
        )
        .route(
            "/api/v1/odontologo-servicios",
            get(odontologo_servicios::list_handler).post(odontologo_servicios::create_handler),
        )
        .route(
            "/api/v1/odontologo-servicios/:id",
            get(odontologo_servicios::get_handler)
                .patch(odontologo_servicios::update_handler)
                .delete(odontologo_servicios::delete_handler),
        )
        .route(
            "/api/v1/odontologo-servicios/odontologo/:odontologo_id",
            get(odontologo_servicios::by_odontologo_handler),
        )
        .route(
            "/api/v1/odontologo-servicios/odontologo/:odontologo_id/disponibles",
            get(odontologo_servicios::disponibles_handler),
        )
        .route(
            "/api/v1/odontologo-servicios/odontologo/:odontologo_id/tratamiento/:tratamiento_id",
            delete(odontologo_servicios::delete_relacion_handler),
        )
        .route(
            "/api/v1/odontologos",
            get(odontologos::list_handler).post(odontologos::create_handler),
        )
        .route("/api/v1/odontologos/mi-perfil", get(odontologos::mi_perfil_handler))
        .route(
            "/api/v1/odontologos/cambiar-password",
            post(odontologos::cambiar_password_handler),
        )
        .route(
            "/api/v1/odontologos/:id",
            get(odontologos::get_handler)
                .patch(odontologos::update_handler)
                .delete(odontologos::delete_handler),
        )
        .route("/api/v1/pacientes", get(pacientes::list_handler).post(pacientes::create_handler))
        .route("/api/v1/pacientes/validar", post(pacientes::validar_handler))
        .route(
            "/api/v1/pacientes/cambiar-password",
            post(pacientes::cambiar_password_handler),
        )
        .route(
            "/api/v1/pacientes/:id",
            get(pacientes::get_handler)
                .patch(pacientes::update_handler)
                .delete(pacientes::delete_handler),
        )
        .route("/api/v1/roles", get(roles::list_handler).post(roles::create_handler))
        .route(
            "/api/v1/roles/:id",
            get(roles::get_handler)
                .patch(roles::update_handler)
                .delete(roles::delete_handler),
        )
        .route(
            "/api/v1/tratamientos",
            get(tratamientos::list_handler).post(tratamientos::create_handler),
        )
        .route(
            "/api/v1/tratamientos/:id",
            get(tratamientos::get_handler)
                .patch(tratamientos::update_handler)
                .delete(tratamientos::delete_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(driver)
}
