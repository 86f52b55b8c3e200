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

//! APIs to manage patients.

use crate::driver::Driver;
use crate::model::{ActualizacionPaciente, EmailAddress, NuevoPaciente, Paciente, Password};
use crate::rest::{
    campo_fecha, campo_fecha_opcional, campo_requerido, campo_texto, campo_texto_opcional,
    errores_de_validacion, falta, valida, CambiarPasswordRequest, EmptyBody, RestResult,
    UsuarioAutenticado,
};
use axum::extract::{Path, State};
use axum::{http, Json};
use serde::Deserialize;

/// Loosely-typed body of the patient creation request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct CrearPacienteRequest {
    /// Full name.
    nombre: Option<String>,

    /// Birth date as `YYYY-MM-DD`.
    fecha_nacimiento: Option<String>,

    /// Contact phone number.
    telefono: Option<String>,

    /// Contact email address, unique among active patients.
    email: Option<String>,

    /// Role assigned to the patient.
    rol_id: Option<i64>,

    /// Initial password.  When absent, the configured default one is assigned.
    password: Option<String>,
}

impl CrearPacienteRequest {
    /// Checks all fields against the domain rules, reporting every problem at once.
    fn validar(self) -> RestResult<(NuevoPaciente, Option<Password>)> {
        let mut errores = vec![];
        let nombre = campo_texto(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let fecha_nacimiento =
            campo_fecha(&mut errores, "fecha_nacimiento", self.fecha_nacimiento.as_deref());
        let telefono = campo_texto(&mut errores, "telefono", self.telefono.as_deref(), 15);
        let email = match self.email.as_deref() {
            Some(email) => valida(&mut errores, "email", EmailAddress::new(email)),
            None => falta(&mut errores, "email"),
        };
        let rol_id = campo_requerido(&mut errores, "rol_id", self.rol_id);
        let password = match self.password.as_deref() {
            Some(password) => valida(&mut errores, "password", Password::new(password)),
            None => None,
        };

        match (nombre, fecha_nacimiento, telefono, email, rol_id) {
            (Some(nombre), Some(fecha_nacimiento), Some(telefono), Some(email), Some(rol_id))
                if errores.is_empty() =>
            {
                Ok((NuevoPaciente { nombre, fecha_nacimiento, telefono, email, rol_id }, password))
            }
            _ => Err(errores_de_validacion(errores)),
        }
    }
}

/// Loosely-typed body of the patient update request.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ActualizarPacienteRequest {
    /// New full name, if any.
    nombre: Option<String>,

    /// New birth date as `YYYY-MM-DD`, if any.
    fecha_nacimiento: Option<String>,

    /// New phone number, if any.
    telefono: Option<String>,

    /// New email address, if any.
    email: Option<String>,

    /// New role, if any.
    rol_id: Option<i64>,
}

impl ActualizarPacienteRequest {
    /// Checks the supplied fields against the domain rules.
    fn validar(self) -> RestResult<ActualizacionPaciente> {
        let mut errores = vec![];
        let nombre = campo_texto_opcional(&mut errores, "nombre", self.nombre.as_deref(), 100);
        let fecha_nacimiento = campo_fecha_opcional(
            &mut errores,
            "fecha_nacimiento",
            self.fecha_nacimiento.as_deref(),
        );
        let telefono = campo_texto_opcional(&mut errores, "telefono", self.telefono.as_deref(), 15);
        let email = self
            .email
            .as_deref()
            .and_then(|email| valida(&mut errores, "email", EmailAddress::new(email)));

        if !errores.is_empty() {
            return Err(errores_de_validacion(errores));
        }
        Ok(ActualizacionPaciente { nombre, fecha_nacimiento, telefono, email, rol_id: self.rol_id })
    }
}

/// Body of the credentials validation request used by the login flow.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Default, serde::Serialize))]
pub(crate) struct ValidarRequest {
    /// Email to look up.
    email: Option<String>,

    /// Password to check.
    password: Option<String>,
}

/// API handler to list all active patients.
pub(crate) async fn list_handler(
    State(driver): State<Driver>,
    _body: EmptyBody,
) -> RestResult<Json<Vec<Paciente>>> {
    Ok(Json(driver.find_pacientes().await?))
}

/// API handler to create a patient.
pub(crate) async fn create_handler(
    State(driver): State<Driver>,
    Json(request): Json<CrearPacienteRequest>,
) -> RestResult<(http::StatusCode, Json<Paciente>)> {
    let (datos, password) = request.validar()?;
    let paciente = driver.crear_paciente(datos, password).await?;
    Ok((http::StatusCode::CREATED, Json(paciente)))
}

/// API handler to fetch one patient.
pub(crate) async fn get_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<Json<Paciente>> {
    Ok(Json(driver.find_paciente(id).await?))
}

/// API handler to apply a partial update to a patient.
pub(crate) async fn update_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Json(request): Json<ActualizarPacienteRequest>,
) -> RestResult<Json<Paciente>> {
    let cambios = request.validar()?;
    Ok(Json(driver.actualizar_paciente(id, cambios).await?))
}

/// API handler to soft-delete a patient.
pub(crate) async fn delete_handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    _body: EmptyBody,
) -> RestResult<http::StatusCode> {
    driver.eliminar_paciente(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

/// API handler to check a patient's credentials on behalf of the login flow.
///
/// Replies `null` both for an unknown email and for a wrong password.
pub(crate) async fn validar_handler(
    State(driver): State<Driver>,
    Json(request): Json<ValidarRequest>,
) -> RestResult<Json<Option<Paciente>>> {
    let mut errores = vec![];
    let email = campo_requerido(&mut errores, "email", request.email.as_deref());
    let password = match request.password.as_deref() {
        Some(password) => valida(&mut errores, "password", Password::new(password)),
        None => falta(&mut errores, "password"),
    };
    match (email, password) {
        (Some(email), Some(password)) if errores.is_empty() => {
            Ok(Json(driver.validar_credenciales(email, password).await?))
        }
        _ => Err(errores_de_validacion(errores)),
    }
}

/// API handler for the authenticated patient to change their own password.
pub(crate) async fn cambiar_password_handler(
    State(driver): State<Driver>,
    UsuarioAutenticado(id): UsuarioAutenticado,
    Json(request): Json<CambiarPasswordRequest>,
) -> RestResult<http::StatusCode> {
    let (actual, nueva) = request.validar()?;
    driver.cambiar_password_paciente(id, actual, nueva).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;

    /// Returns the route of the patient collection.
    fn route_coleccion(method: http::Method) -> (http::Method, String) {
        (method, "/api/v1/pacientes".to_owned())
    }

    /// Returns the route of one patient.
    fn route_uno(method: http::Method, id: i64) -> (http::Method, String) {
        (method, format!("/api/v1/pacientes/{}", id))
    }

    #[tokio::test]
    async fn test_create() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;

        let request = CrearPacienteRequest {
            nombre: Some("Ana García".to_owned()),
            fecha_nacimiento: Some("1990-04-15".to_owned()),
            telefono: Some("555-0101".to_owned()),
            email: Some("ana@example.com".to_owned()),
            rol_id: Some(rol.id),
            password: None,
        };
        let response = OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Paciente>()
            .await;
        assert_eq!("Ana García", response.nombre);

        assert_eq!(response, context.driver.clone().find_paciente(response.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_reporta_todos_los_errores() {
        let context = setup().await;

        let request = CrearPacienteRequest {
            telefono: Some("555-0101".to_owned()),
            fecha_nacimiento: Some("ayer".to_owned()),
            ..Default::default()
        };
        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("nombre: es obligatorio.*fecha_nacimiento.*email: es obligatorio")
            .await;
    }

    #[tokio::test]
    async fn test_create_email_duplicado_da_conflicto() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        context.paciente_de_prueba("ana@example.com", rol.id).await;

        let request = CrearPacienteRequest {
            nombre: Some("Otra Ana".to_owned()),
            fecha_nacimiento: Some("1985-01-01".to_owned()),
            telefono: Some("555-0303".to_owned()),
            email: Some("ana@example.com".to_owned()),
            rol_id: Some(rol.id),
            password: None,
        };
        OneShotBuilder::new(context.app(), route_coleccion(http::Method::POST))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("ana@example.com")
            .await;
    }

    #[tokio::test]
    async fn test_get_y_list() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let paciente = context.paciente_de_prueba("ana@example.com", rol.id).await;

        let response = OneShotBuilder::new(context.app(), route_uno(http::Method::GET, paciente.id))
            .send_empty()
            .await
            .expect_json::<Paciente>()
            .await;
        assert_eq!(paciente, response);

        let response = OneShotBuilder::new(context.app(), route_coleccion(http::Method::GET))
            .send_empty()
            .await
            .expect_json::<Vec<Paciente>>()
            .await;
        assert_eq!(vec![paciente], response);

        OneShotBuilder::new(context.app(), route_uno(http::Method::GET, 999))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("id 999 no existe")
            .await;
    }

    #[tokio::test]
    async fn test_update() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let paciente = context.paciente_de_prueba("ana@example.com", rol.id).await;

        let request = ActualizarPacienteRequest {
            telefono: Some("555-9999".to_owned()),
            ..Default::default()
        };
        let response =
            OneShotBuilder::new(context.app(), route_uno(http::Method::PATCH, paciente.id))
                .send_json(request)
                .await
                .expect_json::<Paciente>()
                .await;
        assert_eq!("555-9999", response.telefono);
        assert_eq!(paciente.nombre, response.nombre);
    }

    #[tokio::test]
    async fn test_delete() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let paciente = context.paciente_de_prueba("ana@example.com", rol.id).await;

        OneShotBuilder::new(context.app(), route_uno(http::Method::DELETE, paciente.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        OneShotBuilder::new(context.app(), route_uno(http::Method::GET, paciente.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("no existe")
            .await;
    }

    #[tokio::test]
    async fn test_delete_rechaza_cuerpo() {
        let context = setup().await;

        OneShotBuilder::new(context.app(), route_uno(http::Method::DELETE, 1))
            .send_text("should not be here")
            .await
            .expect_status(http::StatusCode::PAYLOAD_TOO_LARGE)
            .expect_error("should be empty")
            .await;
    }

    #[tokio::test]
    async fn test_validar() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let paciente = context.paciente_de_prueba("ana@example.com", rol.id).await;

        let route = (http::Method::POST, "/api/v1/pacientes/validar".to_owned());

        let request = ValidarRequest {
            email: Some("ana@example.com".to_owned()),
            password: Some("NuevaPass1".to_owned()),
        };
        let response = OneShotBuilder::new(context.app(), route.clone())
            .send_json(request)
            .await
            .expect_json::<Option<Paciente>>()
            .await;
        assert_eq!(Some(paciente), response);

        let request = ValidarRequest {
            email: Some("ana@example.com".to_owned()),
            password: Some("incorrecta".to_owned()),
        };
        let response = OneShotBuilder::new(context.app(), route)
            .send_json(request)
            .await
            .expect_json::<Option<Paciente>>()
            .await;
        assert_eq!(None, response);
    }

    #[tokio::test]
    async fn test_cambiar_password() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let paciente = context.paciente_de_prueba("ana@example.com", rol.id).await;

        let route = (http::Method::POST, "/api/v1/pacientes/cambiar-password".to_owned());

        let request = CambiarPasswordRequest {
            password_actual: Some("NuevaPass1".to_owned()),
            nueva_password: Some("OtraPass123".to_owned()),
        };
        OneShotBuilder::new(context.app(), route.clone())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("x-user-id")
            .await;

        let request = CambiarPasswordRequest {
            password_actual: Some("NuevaPass1".to_owned()),
            nueva_password: Some("OtraPass123".to_owned()),
        };
        OneShotBuilder::new(context.app(), route.clone())
            .with_header("x-user-id", paciente.id)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        let request = CambiarPasswordRequest {
            password_actual: Some("NuevaPass1".to_owned()),
            nueva_password: Some("TerceraPass1".to_owned()),
        };
        OneShotBuilder::new(context.app(), route)
            .with_header("x-user-id", paciente.id)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("contraseña actual")
            .await;
    }

    #[tokio::test]
    async fn test_cambiar_password_requiere_ambos_campos() {
        let context = setup().await;

        let route = (http::Method::POST, "/api/v1/pacientes/cambiar-password".to_owned());
        let request = CambiarPasswordRequest {
            password_actual: Some("NuevaPass1".to_owned()),
            nueva_password: None,
        };
        OneShotBuilder::new(context.app(), route)
            .with_header("x-user-id", 1)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("nuevaPassword: es obligatorio")
            .await;
    }
}
