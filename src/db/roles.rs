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

//! Database queries to manipulate roles.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, Rol};
use sqlx::Row;
use time::OffsetDateTime;

/// Creates a new role named `nombre`.
pub(crate) async fn create(ex: &mut Executor, nombre: String, now: OffsetDateTime) -> DbResult<Rol> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO roles (nombre, fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&nombre)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO roles (nombre, fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&nombre)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Rol { id, nombre, auditoria })
}

/// Fetches all active roles in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Rol>> {
    let query_str = "SELECT * FROM roles WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query_as::<_, Rol>(query_str).fetch_all(ex).await.map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            sqlx::query_as::<_, Rol>(query_str).fetch_all(ex).await.map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Fetches the active role with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Rol> {
    let rol = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM roles WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Rol>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM roles WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Rol>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    rol.ok_or(DbError::NotFound)
}

/// Fetches the active role with the given `nombre`, if any.
pub(crate) async fn get_by_nombre(ex: &mut Executor, nombre: &str) -> DbResult<Option<Rol>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM roles WHERE nombre = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Rol>(query_str)
                .bind(nombre)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM roles WHERE nombre = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Rol>(query_str)
                .bind(nombre)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Persists the mutable fields of `rol`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, rol: &Rol) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE roles SET nombre = $1, fecha_modificacion = $2
                WHERE id = $3 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&rol.nombre)
                .bind(rol.auditoria.fecha_modificacion)
                .bind(rol.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE roles SET nombre = ?, fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&rol.nombre)
                .bind(rol.auditoria.fecha_modificacion)
                .bind(rol.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active role with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE roles SET fecha_eliminacion = $1, fecha_modificacion = $1
                WHERE id = $2 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(now)
                .bind(id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE roles SET fecha_eliminacion = ?1, fecha_modificacion = ?1
                WHERE id = ?2 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(now)
                .bind(id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}
