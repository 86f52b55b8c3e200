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

//! Operations on patients.

use crate::db::pacientes;
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{
    validar_password_nueva, ActualizacionPaciente, NuevoPaciente, Paciente, Password,
};

impl Driver {
    /// Creates a new patient.
    ///
    /// If the caller does not supply a `password`, the patient gets the configured default one
    /// and is expected to change it on first login.
    pub(crate) async fn crear_paciente(
        self,
        datos: NuevoPaciente,
        password: Option<Password>,
    ) -> DriverResult<Paciente> {
        let hash = match password {
            Some(password) => password.validate_and_hash(validar_password_nueva)?,
            None => self.default_password.clone().validate_and_hash(|_| None)?,
        };

        let mut ex = self.db.ex().await?;
        if pacientes::get_by_email(&mut ex, datos.email.as_str()).await?.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "Ya existe un paciente con el email {}",
                datos.email.as_str()
            )));
        }
        Ok(pacientes::create(&mut ex, datos, hash, self.clock.now_utc()).await?)
    }

    /// Returns all active patients.
    pub(crate) async fn find_pacientes(self) -> DriverResult<Vec<Paciente>> {
        let mut ex = self.db.ex().await?;
        Ok(pacientes::find_all(&mut ex).await?)
    }

    /// Returns the active patient with the given `id`.
    pub(crate) async fn find_paciente(self, id: i64) -> DriverResult<Paciente> {
        let mut ex = self.db.ex().await?;
        pacientes::find_one(&mut ex, id)
            .await
            .map_err(|e| no_existe(id, e))
    }

    /// Applies the partial update `cambios` to the patient with the given `id` and returns the
    /// updated entity.
    pub(crate) async fn actualizar_paciente(
        self,
        id: i64,
        cambios: ActualizacionPaciente,
    ) -> DriverResult<Paciente> {
        let mut ex = self.db.ex().await?;
        let mut paciente = pacientes::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(email) = &cambios.email {
            if email.as_str() != paciente.email {
                if let Some(otro) = pacientes::get_by_email(&mut ex, email.as_str()).await? {
                    if otro.id != id {
                        return Err(DriverError::AlreadyExists(format!(
                            "Ya existe un paciente con el email {}",
                            email.as_str()
                        )));
                    }
                }
            }
        }

        if let Some(nombre) = cambios.nombre {
            paciente.nombre = nombre;
        }
        if let Some(fecha_nacimiento) = cambios.fecha_nacimiento {
            paciente.fecha_nacimiento = fecha_nacimiento;
        }
        if let Some(telefono) = cambios.telefono {
            paciente.telefono = telefono;
        }
        if let Some(email) = cambios.email {
            paciente.email = email.as_str().to_owned();
        }
        if let Some(rol_id) = cambios.rol_id {
            paciente.rol_id = rol_id;
        }
        paciente.auditoria.fecha_modificacion = self.clock.now_utc();

        pacientes::update(&mut ex, &paciente).await?;
        Ok(paciente)
    }

    /// Soft-deletes the patient with the given `id`.
    pub(crate) async fn eliminar_paciente(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        pacientes::soft_delete(&mut ex, id, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(id, e))
    }

    /// Checks a patient's credentials for the login flow.
    ///
    /// Returns `None` both when no active patient has the given `email` and when the password
    /// does not match, so that callers cannot tell the two cases apart.
    pub(crate) async fn validar_credenciales(
        self,
        email: &str,
        password: Password,
    ) -> DriverResult<Option<Paciente>> {
        let mut ex = self.db.ex().await?;
        let paciente = match pacientes::get_by_email(&mut ex, email).await? {
            Some(paciente) => paciente,
            None => return Ok(None),
        };
        let hash = pacientes::get_password(&mut ex, paciente.id).await?;
        if password.verify(&hash)? {
            Ok(Some(paciente))
        } else {
            Ok(None)
        }
    }

    /// Replaces the password of the patient with the given `id` after verifying that `actual`
    /// matches the stored one.
    pub(crate) async fn cambiar_password_paciente(
        self,
        id: i64,
        actual: Password,
        nueva: Password,
    ) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        let hash = pacientes::get_password(&mut ex, id).await.map_err(|e| no_existe(id, e))?;
        if !actual.verify(&hash)? {
            return Err(DriverError::Unauthorized(
                "La contraseña actual no es correcta".to_owned(),
            ));
        }
        let hash = nueva.validate_and_hash(validar_password_nueva)?;
        Ok(pacientes::set_password(&mut ex, id, hash, self.clock.now_utc()).await?)
    }
}

/// Rewrites a `NotFound` database error into a message that names the patient `id`.
fn no_existe(id: i64, e: crate::db::DbError) -> DriverError {
    match e {
        crate::db::DbError::NotFound => {
            DriverError::NotFound(format!("El paciente con id {} no existe", id))
        }
        e => e.into(),
    }
}
