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

//! Operations on the key/value configuration settings.

use crate::db::{configuracion, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::Configuracion;

impl Driver {
    /// Creates a new setting.
    pub(crate) async fn crear_configuracion(
        self,
        clave: String,
        valor: String,
        descripcion: Option<String>,
    ) -> DriverResult<Configuracion> {
        let mut ex = self.db.ex().await?;
        if configuracion::get(&mut ex, &clave).await?.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "Ya existe una configuración con la clave {}",
                clave
            )));
        }
        Ok(configuracion::create(&mut ex, clave, valor, descripcion, self.clock.now_utc()).await?)
    }

    /// Returns all active settings.
    pub(crate) async fn find_configuraciones(self) -> DriverResult<Vec<Configuracion>> {
        let mut ex = self.db.ex().await?;
        Ok(configuracion::find_all(&mut ex).await?)
    }

    /// Returns the active setting with the given `clave`.
    pub(crate) async fn find_configuracion(self, clave: &str) -> DriverResult<Configuracion> {
        let mut ex = self.db.ex().await?;
        configuracion::find_one(&mut ex, clave).await.map_err(|e| no_existe(clave, e))
    }

    /// Updates the value and/or description of the setting with the given `clave` and returns
    /// the updated entity.
    pub(crate) async fn actualizar_configuracion(
        self,
        clave: &str,
        valor: Option<String>,
        descripcion: Option<String>,
    ) -> DriverResult<Configuracion> {
        let mut ex = self.db.ex().await?;
        let mut config =
            configuracion::find_one(&mut ex, clave).await.map_err(|e| no_existe(clave, e))?;

        if let Some(valor) = valor {
            config.valor = valor;
        }
        if let Some(descripcion) = descripcion {
            config.descripcion = Some(descripcion);
        }
        config.auditoria.fecha_modificacion = self.clock.now_utc();

        configuracion::update(&mut ex, &config).await?;
        Ok(config)
    }

    /// Soft-deletes the setting with the given `clave`.
    pub(crate) async fn eliminar_configuracion(self, clave: &str) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        configuracion::soft_delete(&mut ex, clave, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(clave, e))
    }
}

/// Rewrites a `NotFound` database error into a message that names the setting `clave`.
fn no_existe(clave: &str, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => {
            DriverError::NotFound(format!("La configuración con clave {} no existe", clave))
        }
        e => e.into(),
    }
}
