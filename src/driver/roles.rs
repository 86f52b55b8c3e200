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

//! Operations on roles.

use crate::db::{roles, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::Rol;

impl Driver {
    /// Creates a new role named `nombre`.
    pub(crate) async fn crear_rol(self, nombre: String) -> DriverResult<Rol> {
        let mut ex = self.db.ex().await?;
        if roles::get_by_nombre(&mut ex, &nombre).await?.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "Ya existe un rol con el nombre {}",
                nombre
            )));
        }
        Ok(roles::create(&mut ex, nombre, self.clock.now_utc()).await?)
    }

    /// Returns all active roles.
    pub(crate) async fn find_roles(self) -> DriverResult<Vec<Rol>> {
        let mut ex = self.db.ex().await?;
        Ok(roles::find_all(&mut ex).await?)
    }

    /// Returns the active role with the given `id`.
    pub(crate) async fn find_rol(self, id: i64) -> DriverResult<Rol> {
        let mut ex = self.db.ex().await?;
        roles::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Renames the role with the given `id` and returns the updated entity.
    pub(crate) async fn actualizar_rol(self, id: i64, nombre: String) -> DriverResult<Rol> {
        let mut ex = self.db.ex().await?;
        let mut rol = roles::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if nombre != rol.nombre {
            if let Some(otro) = roles::get_by_nombre(&mut ex, &nombre).await? {
                if otro.id != id {
                    return Err(DriverError::AlreadyExists(format!(
                        "Ya existe un rol con el nombre {}",
                        nombre
                    )));
                }
            }
        }

        rol.nombre = nombre;
        rol.auditoria.fecha_modificacion = self.clock.now_utc();
        roles::update(&mut ex, &rol).await?;
        Ok(rol)
    }

    /// Soft-deletes the role with the given `id`.
    pub(crate) async fn eliminar_rol(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        roles::soft_delete(&mut ex, id, self.clock.now_utc()).await.map_err(|e| no_existe(id, e))
    }
}

/// Rewrites a `NotFound` database error into a message that names the role `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound(format!("El rol con id {} no existe", id)),
        e => e.into(),
    }
}
