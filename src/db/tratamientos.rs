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

//! Database queries to manipulate treatments.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, NuevoTratamiento, Tratamiento};
use sqlx::Row;
use time::OffsetDateTime;

/// Creates a new treatment from the pre-validated `datos`.
pub(crate) async fn create(
    ex: &mut Executor,
    datos: NuevoTratamiento,
    now: OffsetDateTime,
) -> DbResult<Tratamiento> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO tratamientos
                    (nombre, descripcion, precio, duracion, fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(&datos.descripcion)
                .bind(datos.precio)
                .bind(datos.duracion)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO tratamientos
                    (nombre, descripcion, precio, duracion, fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(&datos.descripcion)
                .bind(datos.precio)
                .bind(datos.duracion)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Tratamiento {
        id,
        nombre: datos.nombre,
        descripcion: datos.descripcion,
        precio: datos.precio,
        duracion: datos.duracion,
        auditoria,
    })
}

/// Fetches all active treatments in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Tratamiento>> {
    let query_str = "SELECT * FROM tratamientos WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, Tratamiento>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, Tratamiento>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active treatment with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Tratamiento> {
    let tratamiento = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM tratamientos WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM tratamientos WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    tratamiento.ok_or(DbError::NotFound)
}

/// Fetches the active treatment with the given `descripcion`, if any.
pub(crate) async fn get_by_descripcion(
    ex: &mut Executor,
    descripcion: &str,
) -> DbResult<Option<Tratamiento>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM tratamientos WHERE descripcion = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(descripcion)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT * FROM tratamientos WHERE descripcion = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(descripcion)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Persists the mutable fields of `tratamiento`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, tratamiento: &Tratamiento) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE tratamientos
                SET nombre = $1, descripcion = $2, precio = $3, duracion = $4,
                    fecha_modificacion = $5
                WHERE id = $6 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&tratamiento.nombre)
                .bind(&tratamiento.descripcion)
                .bind(tratamiento.precio)
                .bind(tratamiento.duracion)
                .bind(tratamiento.auditoria.fecha_modificacion)
                .bind(tratamiento.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE tratamientos
                SET nombre = ?, descripcion = ?, precio = ?, duracion = ?,
                    fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&tratamiento.nombre)
                .bind(&tratamiento.descripcion)
                .bind(tratamiento.precio)
                .bind(tratamiento.duracion)
                .bind(tratamiento.auditoria.fecha_modificacion)
                .bind(tratamiento.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active treatment with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE tratamientos SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE tratamientos SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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
