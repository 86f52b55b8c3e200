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

//! Operations on treatments.

use crate::db::{tratamientos, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{ActualizacionTratamiento, NuevoTratamiento, Tratamiento};

impl Driver {
    /// Creates a new treatment.
    pub(crate) async fn crear_tratamiento(self, datos: NuevoTratamiento) -> DriverResult<Tratamiento> {
        let mut ex = self.db.ex().await?;
        if tratamientos::get_by_descripcion(&mut ex, &datos.descripcion).await?.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "Ya existe un tratamiento con la descripción {}",
                datos.descripcion
            )));
        }
        Ok(tratamientos::create(&mut ex, datos, self.clock.now_utc()).await?)
    }

    /// Returns all active treatments.
    pub(crate) async fn find_tratamientos(self) -> DriverResult<Vec<Tratamiento>> {
        let mut ex = self.db.ex().await?;
        Ok(tratamientos::find_all(&mut ex).await?)
    }

    /// Returns the active treatment with the given `id`.
    pub(crate) async fn find_tratamiento(self, id: i64) -> DriverResult<Tratamiento> {
        let mut ex = self.db.ex().await?;
        tratamientos::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Applies the partial update `cambios` to the treatment with the given `id` and returns the
    /// updated entity.
    pub(crate) async fn actualizar_tratamiento(
        self,
        id: i64,
        cambios: ActualizacionTratamiento,
    ) -> DriverResult<Tratamiento> {
        let mut ex = self.db.ex().await?;
        let mut tratamiento =
            tratamientos::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(descripcion) = &cambios.descripcion {
            if *descripcion != tratamiento.descripcion {
                if let Some(otro) = tratamientos::get_by_descripcion(&mut ex, descripcion).await? {
                    if otro.id != id {
                        return Err(DriverError::AlreadyExists(format!(
                            "Ya existe un tratamiento con la descripción {}",
                            descripcion
                        )));
                    }
                }
            }
        }

        if let Some(nombre) = cambios.nombre {
            tratamiento.nombre = nombre;
        }
        if let Some(descripcion) = cambios.descripcion {
            tratamiento.descripcion = descripcion;
        }
        if let Some(precio) = cambios.precio {
            tratamiento.precio = precio;
        }
        if let Some(duracion) = cambios.duracion {
            tratamiento.duracion = duracion;
        }
        tratamiento.auditoria.fecha_modificacion = self.clock.now_utc();

        tratamientos::update(&mut ex, &tratamiento).await?;
        Ok(tratamiento)
    }

    /// Soft-deletes the treatment with the given `id`.
    pub(crate) async fn eliminar_tratamiento(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        tratamientos::soft_delete(&mut ex, id, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(id, e))
    }
}

/// Rewrites a `NotFound` database error into a message that names the treatment `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => {
            DriverError::NotFound(format!("El tratamiento con id {} no existe", id))
        }
        e => e.into(),
    }
}
