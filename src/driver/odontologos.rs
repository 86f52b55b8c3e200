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

//! Operations on dentists.

use crate::db::{odontologos, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{
    validar_password_nueva, ActualizacionOdontologo, NuevoOdontologo, Odontologo, Password,
};

impl Driver {
    /// Creates a new dentist with the configured default password.
    pub(crate) async fn crear_odontologo(self, datos: NuevoOdontologo) -> DriverResult<Odontologo> {
        let hash = self.default_password.clone().validate_and_hash(|_| None)?;

        let mut ex = self.db.ex().await?;
        if odontologos::get_by_nombre(&mut ex, &datos.nombre).await?.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "Ya existe un odontólogo con el nombre {}",
                datos.nombre
            )));
        }
        Ok(odontologos::create(&mut ex, datos, Some(hash), self.clock.now_utc()).await?)
    }

    /// Returns all active dentists.
    pub(crate) async fn find_odontologos(self) -> DriverResult<Vec<Odontologo>> {
        let mut ex = self.db.ex().await?;
        Ok(odontologos::find_all(&mut ex).await?)
    }

    /// Returns the active dentist with the given `id`.
    pub(crate) async fn find_odontologo(self, id: i64) -> DriverResult<Odontologo> {
        let mut ex = self.db.ex().await?;
        odontologos::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Applies the partial update `cambios` to the dentist with the given `id` and returns the
    /// updated entity.
    pub(crate) async fn actualizar_odontologo(
        self,
        id: i64,
        cambios: ActualizacionOdontologo,
    ) -> DriverResult<Odontologo> {
        let mut ex = self.db.ex().await?;
        let mut odontologo =
            odontologos::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(nombre) = &cambios.nombre {
            if *nombre != odontologo.nombre {
                if let Some(otro) = odontologos::get_by_nombre(&mut ex, nombre).await? {
                    if otro.id != id {
                        return Err(DriverError::AlreadyExists(format!(
                            "Ya existe un odontólogo con el nombre {}",
                            nombre
                        )));
                    }
                }
            }
        }

        if let Some(nombre) = cambios.nombre {
            odontologo.nombre = nombre;
        }
        if let Some(especialidad) = cambios.especialidad {
            odontologo.especialidad = especialidad;
        }
        if let Some(telefono) = cambios.telefono {
            odontologo.telefono = telefono;
        }
        if let Some(rol_id) = cambios.rol_id {
            odontologo.rol_id = rol_id;
        }
        odontologo.auditoria.fecha_modificacion = self.clock.now_utc();

        odontologos::update(&mut ex, &odontologo).await?;
        Ok(odontologo)
    }

    /// Soft-deletes the dentist with the given `id`.
    pub(crate) async fn eliminar_odontologo(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        odontologos::soft_delete(&mut ex, id, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(id, e))
    }

    /// Replaces the password of the dentist with the given `id` after verifying that `actual`
    /// matches the stored one.
    pub(crate) async fn cambiar_password_odontologo(
        self,
        id: i64,
        actual: Password,
        nueva: Password,
    ) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        let hash = match odontologos::get_password(&mut ex, id).await.map_err(|e| no_existe(id, e))?
        {
            Some(hash) => hash,
            None => {
                return Err(DriverError::Unauthorized(
                    "La cuenta no tiene contraseña establecida".to_owned(),
                ));
            }
        };
        if !actual.verify(&hash)? {
            return Err(DriverError::Unauthorized(
                "La contraseña actual no es correcta".to_owned(),
            ));
        }
        let hash = nueva.validate_and_hash(validar_password_nueva)?;
        Ok(odontologos::set_password(&mut ex, id, hash, self.clock.now_utc()).await?)
    }
}

/// Rewrites a `NotFound` database error into a message that names the dentist `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => {
            DriverError::NotFound(format!("El odontólogo con id {} no existe", id))
        }
        e => e.into(),
    }
}
