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

//! APIs to manage dentists.

use crate::driver::Driver;
use crate::model::{ActualizacionOdontologo, NuevoOdontologo, Odontologo};
use crate::rest::{
    campo_requerido, campo_texto, campo_texto_opcional, errores_de_validacion,
    CambiarPasswordRequest, EmptyBody, RestResult, UsuarioAutenticado,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the dentist creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearOdontologoRequest {
    /// Full name, unique among active dentists.
    nombre: Option<String>,

    /// Specialty.
    especialidad: Option<String>,

    /// Contact phone number.
    telefono: Option<String>,

    /// Role assigned to the dentist.
    rol_id: Option<i64>,
}

impl CrearOdontologoRequest {
    /// Checks all fields against the domain rules, reporting every problem at once.
    fn validar(self) -> RestResult<NuevoOdontologo> {
        let mut errores = vec![];
        let nombre = campo_texto(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let especialidad =
            campo_texto(&mut errores, "especialidad", self.especialidad.as_deref(), 100);
        let telefono = campo_texto(&mut errores, "telefono", self.telefono.as_deref(), 15);
        let rol_id = campo_requerido(&mut errores, "rol_id", self.rol_id);

        match (nombre, especialidad, telefono, rol_id) {
            (Some(nombre), Some(especialidad), Some(telefono), Some(rol_id))
                if errores.is_empty() =>
            {
                Ok(NuevoOdontologo { nombre, especialidad, telefono, rol_id })
            }
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the dentist update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarOdontologoRequest {
    /// New full name, if any.
    nombre: Option<String>,

    /// New specialty, if any.
    especialidad: Option<String>,

    /// New phone number, if any.
    telefono: Option<String>,

    /// New role, if any.
    rol_id: Option<i64>,
}

impl ActualizarOdontologoRequest {
    /// Checks the supplied fields against the domain rules.
    fn validar(self) -> RestResult<ActualizacionOdontologo> {
        let mut errores = vec![];
        let nombre = campo_texto_opcional(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let especialidad =
            campo_texto_opcional(&mut errores, "especialidad", self.especialidad.as_deref(), 100);
        let telefono = campo_texto_opcional(&mut errores, "telefono", self.telefono.as_deref(), 15);

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok(ActualizacionOdontologo { nombre, especialidad, telefono, rol_id: self.rol_id })
    }
}

/// API handler to list all active dentists.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Odontologo>>> {
    Ok(Json(driver.find_odontologos().await?))
}

/// API handler to create a dentist.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearOdontologoRequest>,
) -> RestResult<(http::StatusCode, Json<Odontologo>)> {
    let datos = request.validar()?;
    let odontologo = driver.crear_odontologo(datos).await?;
    Ok((http::StatusCode::CREATED, Json(odontologo)))
}

/// API handler to fetch one dentist.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Odontologo>> {
    Ok(Json(driver.find_odontologo(id).await?))
}

/// API handler for the authenticated dentist to fetch their own record.
pub(crate) async fn mi_perfil_handler(
    State(driver): State<Driver>,
    UsuarioAutenticado(id): UsuarioAutenticado,
    _body: EmptyBody,
) -> RestResult<Json<Odontologo>> {
    Ok(Json(driver.find_odontologo(id).await?))
}

/// API handler to apply a partial update to a dentist.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarOdontologoRequest>,
) -> RestResult<Json<Odontologo>> {
    let cambios = request.validar()?;
    Ok(Json(driver.actualizar_odontologo(id, cambios).await?))
}

/// API handler to soft-delete a dentist.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_odontologo(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

/// API handler for the authenticated dentist to change their own password.
pub(crate) async fn cambiar_password_handler(
    State(driver): State<Driver>,
    UsuarioAutenticado(id): UsuarioAutenticado,
    Json(request): Json<CambiarPasswordRequest>,
) -> RestResult<http::StatusCode> {
    let (actual, nueva) = request.validar()?;
    driver.cambiar_password_odontologo(id, actual, nueva).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;

    /// Returns the route of the dentist collection.
    fn route_coleccion(method: http::Method) -> (http::Method, String) {
        (method, "/api/v1/odontologos".to_owned())
    }

    /// Returns the route of one dentist.
    fn route_uno(method: http::Method, id: i64) -> (http::Method, String) {
        (method, format!("/api/v1/odontologos/{}", id))
    }

    #[tokio::test]
    async fn test_create() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;

        let request = CrearOdontologoRequest {
            nombre: Some("Dra. Pérez".to_owned()),
            especialidad: Some("Ortodoncia".to_owned()),
            telefono: Some("555-0202".to_owned()),
            rol_id: Some(rol.id),
        };
        let response = OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Odontologo>()
            .await;
        assert_eq!("Dra. Pérez", response.nombre);

        assert_eq!(response, context.driver.clone().find_odontologo(response.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_nombre_duplicado_da_conflicto() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        context.odontologo_de_prueba("Dra. Pérez", rol.id).await;

        let request = CrearOdontologoRequest {
            nombre: Some("Dra. Pérez".to_owned()),
            especialidad: Some("Endodoncia".to_owned()),
            telefono: Some("555-0404".to_owned()),
            rol_id: Some(rol.id),
        };
        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Dra. Pérez")
            .await;
    }

    #[tokio::test]
    async fn test_create_reporta_todos_los_errores() {
        let context = setup().await;

        let request = CrearOdontologoRequest {
            especialidad: Some("Ortodoncia".to_owned()),
            ..Default::default()
        };
        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("nombre: es obligatorio.*telefono: es obligatorio.*rol_id")
            .await;
    }

    #[tokio::test]
    async fn test_update_y_delete() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;

        let request = ActualizarOdontologoRequest {
            especialidad: Some("Endodoncia".to_owned()),
            ..Default::default()
        };
        let response =
            OneShotBuilder::new(context.app(), route_uno(http::Method::PATCH, odontologo.id))
                .send_json(request)
                .await
                .expect_json::<Odontologo>()
                .await;
        assert_eq!("Endodoncia", response.especialidad);
        assert_eq!(odontologo.nombre, response.nombre);

        OneShotBuilder::new(context.app(), route_uno(http::Method::DELETE, odontologo.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        OneShotBuilder::new(context.app(), route_uno(http::Method::GET, odontologo.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("no existe")
            .await;
    }

    #[tokio::test]
    async fn test_mi_perfil() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;

        let route = (http::Method::GET, "/api/v1/odontologos/mi-perfil".to_owned());

        OneShotBuilder::new(context.app(), route.clone())
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("x-user-id")
            .await;

        let response = OneShotBuilder::new(context.app(), route)
            .with_header("x-user-id", odontologo.id)
            .send_empty()
            .await
            .expect_json::<Odontologo>()
            .await;
        assert_eq!(odontologo, response);
    }

    #[tokio::test]
    async fn test_mi_perfil_cabecera_invalida() {
        let context = setup().await;

        let route = (http::Method::GET, "/api/v1/odontologos/mi-perfil".to_owned());
        OneShotBuilder::new(context.app(), route)
            .with_header("x-user-id", "no-un-numero")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("x-user-id no es un identificador")
            .await;
    }

    #[tokio::test]
    async fn test_cambiar_password() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;

        let route = (http::Method::POST, "/api/v1/odontologos/cambiar-password".to_owned());

        let request = CambiarPasswordRequest {
            password_actual: Some(DEFAULT_PASSWORD.to_owned()),
            nueva_password: Some("OtraPass123".to_owned()),
        };
        OneShotBuilder::new(context.app(), route.clone())
            .with_header("x-user-id", odontologo.id)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        let request = CambiarPasswordRequest {
            password_actual: Some(DEFAULT_PASSWORD.to_owned()),
            nueva_password: Some("TerceraPass1".to_owned()),
        };
        OneShotBuilder::new(context.app(), route)
            .with_header("x-user-id", odontologo.id)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("contraseña actual")
            .await;
    }
}
