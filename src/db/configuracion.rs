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

//! Database queries to manipulate the key/value configuration settings.
//!
//! Settings are keyed by `clave` instead of a synthetic id, so that is what all lookups take.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, Configuracion};
use time::OffsetDateTime;

/// Creates a new setting.
pub(crate) async fn create(
    ex: &mut Executor,
    clave: String,
    valor: String,
    descripcion: Option<String>,
    now: OffsetDateTime,
) -> DbResult<Configuracion> {
    let auditoria = Auditoria::nueva(now);
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO configuracion
                    (clave, valor, descripcion, fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5)";
            sqlx::query(query_str)
                .bind(&clave)
                .bind(&valor)
                .bind(&descripcion)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO configuracion
                    (clave, valor, descripcion, fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?)";
            sqlx::query(query_str)
                .bind(&clave)
                .bind(&valor)
                .bind(&descripcion)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }
    }

    Ok(Configuracion { clave, valor, descripcion, auditoria })
}

/// Fetches all active settings in key order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Configuracion>> {
    let query_str = "SELECT * FROM configuracion WHERE fecha_eliminacion IS NULL ORDER BY clave";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, Configuracion>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, Configuracion>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active setting with the given `clave`, if any.
pub(crate) async fn get(ex: &mut Executor, clave: &str) -> DbResult<Option<Configuracion>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM configuracion WHERE clave = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Configuracion>(query_str)
                .bind(clave)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT * FROM configuracion WHERE clave = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Configuracion>(query_str)
                .bind(clave)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Fetches the active setting with the given `clave`.
pub(crate) async fn find_one(ex: &mut Executor, clave: &str) -> DbResult<Configuracion> {
    get(ex, clave).await?.ok_or(DbError::NotFound)
}

/// Persists the mutable fields of `configuracion`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, configuracion: &Configuracion) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE configuracion SET valor = $1, descripcion = $2, fecha_modificacion = $3
                WHERE clave = $4 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&configuracion.valor)
                .bind(&configuracion.descripcion)
                .bind(configuracion.auditoria.fecha_modificacion)
                .bind(&configuracion.clave)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE configuracion SET valor = ?, descripcion = ?, fecha_modificacion = ?
                WHERE clave = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&configuracion.valor)
                .bind(&configuracion.descripcion)
                .bind(configuracion.auditoria.fecha_modificacion)
                .bind(&configuracion.clave)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active setting with the given `clave`.
pub(crate) async fn soft_delete(
    ex: &mut Executor,
    clave: &str,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE configuracion SET fecha_eliminacion = $1, fecha_modificacion = $1
                WHERE clave = $2 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(now)
                .bind(clave)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE configuracion SET fecha_eliminacion = ?1, fecha_modificacion = ?1
                WHERE clave = ?2 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(now)
                .bind(clave)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}
