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

//! APIs to manage the authorization roles assigned to patients and dentists.

use crate::driver::Driver;
use crate::model::Rol;
use crate::rest::{campo_texto, errores_de_validacion, EmptyBody, RestResult};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Maximum length of role names per the schema.
const MAX_NOMBRE_LENGTH: usize = 50;

/// Loosely-typed body of the role creation and update requests.  Both carry the same single
/// field and a role name is always required, so one request type serves both.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct RolRequest {
    /// Name of the role.
    nombre: Option<String>,
}

impl RolRequest {
    /// Checks that the role name was supplied and is within bounds.
    fn validar(self) -> RestResult<String> {
        let mut errores = vec![];
        match campo_texto(&mut errores, "nombre", self.nombre.as_deref(), MAX_NOMBRE_LENGTH) {
            Some(nombre) => Ok(nombre),
            None => Err(errores_de_validacion(errores)),
        }
    }
}

/// API handler to list all active roles.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Rol>>> {
    Ok(Json(driver.find_roles().await?))
}

/// API handler to create a role.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<RolRequest>,
) -> RestResult<(http::StatusCode, Json<Rol>)> {
    let nombre = request.validar()?;
    let rol = driver.crear_rol(nombre).await?;
    Ok((http::StatusCode::CREATED, Json(rol)))
}

/// API handler to fetch one role.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Rol>> {
    Ok(Json(driver.find_rol(id).await?))
}

/// API handler to rename a role.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<RolRequest>,
) -> RestResult<Json<Rol>> {
    let nombre = request.validar()?;
    Ok(Json(driver.actualizar_rol(id, nombre).await?))
}

/// API handler to soft-delete one role.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_rol(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;

    /// Returns the route of the role collection.
    fn route_coleccion(method: http::Method) -> (http::Method, String) {
        (method, "/api/v1/roles".to_owned())
    }

    /// Returns the route of one role.
    fn route_uno(method: http::Method, id: i64) -> (http::Method, String) {
        (method, format!("/api/v1/roles/{}", id))
    }

    #[tokio::test]
    async fn test_create_y_get() {
        let context = setup().await;

        let request = RolRequest { nombre: Some("odontologo".to_owned()) };
        let rol = OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Rol>()
            .await;
        assert_eq!("odontologo", rol.nombre);

        let fetched = OneShotBuilder::new(context.app(), route_uno(http::Method::GET, rol.id))
            .send_empty()
            .await
            .expect_json::<Rol>()
            .await;
        assert_eq!(rol, fetched);
    }

    #[tokio::test]
    async fn test_create_sin_nombre() {
        let context = setup().await;

        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(RolRequest::default())
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("nombre: es obligatorio")
            .await;
    }

    #[tokio::test]
    async fn test_create_duplicado_da_conflicto() {
        let context = setup().await;
        context.rol_de_prueba().await;

        let request = RolRequest { nombre: Some("paciente".to_owned()) };
        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Ya existe un rol")
            .await;
    }

    #[tokio::test]
    async fn test_update_y_delete() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;

        let request = RolRequest { nombre: Some("administrador".to_owned()) };
        let actualizado = OneShotBuilder::new(context.app(), route_uno(http::Method::PATCH, rol.id))
            .send_json(request)
            .await
            .expect_json::<Rol>()
            .await;
        assert_eq!("administrador", actualizado.nombre);

        OneShotBuilder::new(context.app(), route_uno(http::Method::DELETE, rol.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        OneShotBuilder::new(context.app(), route_uno(http::Method::GET, rol.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("El rol con id .* no existe")
            .await;
    }
}
