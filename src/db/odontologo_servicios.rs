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

//! Database queries to manipulate the associations between dentists and the treatments they
//! are able to perform.
//!
//! Associations have two removal paths: removal by surrogate id soft-deletes the row like any
//! other entity, while removal by natural pair hard-deletes it so that the pair can be
//! re-created later.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{
    Auditoria, OdontologoServicio, OdontologoServicioDetalle, Tratamiento, TratamientoResumen,
};
use sqlx::Row;
use time::OffsetDateTime;

/// Associates the treatment `tratamiento_id` with the dentist `odontologo_id`.
pub(crate) async fn create(
    ex: &mut Executor,
    odontologo_id: i64,
    tratamiento_id: i64,
    now: OffsetDateTime,
) -> DbResult<OdontologoServicio> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO odontologo_servicios
                    (odontologo_id, tratamiento_id, fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO odontologo_servicios
                    (odontologo_id, tratamiento_id, fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(OdontologoServicio { id, odontologo_id, tratamiento_id, auditoria })
}

/// Fetches the active association for the given pair, if any.
pub(crate) async fn get_by_pair(
    ex: &mut Executor,
    odontologo_id: i64,
    tratamiento_id: i64,
) -> DbResult<Option<OdontologoServicio>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM odontologo_servicios
                WHERE odontologo_id = $1 AND tratamiento_id = $2 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, OdontologoServicio>(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM odontologo_servicios
                WHERE odontologo_id = ? AND tratamiento_id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, OdontologoServicio>(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Fetches the active association with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<OdontologoServicio> {
    let asociacion = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM odontologo_servicios WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, OdontologoServicio>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT * FROM odontologo_servicios WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, OdontologoServicio>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    asociacion.ok_or(DbError::NotFound)
}

/// Persists the mutable fields of `asociacion`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, asociacion: &OdontologoServicio) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE odontologo_servicios
                SET tratamiento_id = $1, fecha_modificacion = $2
                WHERE id = $3 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(asociacion.tratamiento_id)
                .bind(asociacion.auditoria.fecha_modificacion)
                .bind(asociacion.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE odontologo_servicios
                SET tratamiento_id = ?, fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(asociacion.tratamiento_id)
                .bind(asociacion.auditoria.fecha_modificacion)
                .bind(asociacion.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active association with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE odontologo_servicios SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE odontologo_servicios SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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

/// Fetches all active associations joined with the dentists and treatments they reference.
pub(crate) async fn find_all_detalle(ex: &mut Executor) -> DbResult<Vec<OdontologoServicioDetalle>> {
    let query_str = "
        SELECT os.id, os.odontologo_id, o.nombre AS odontologo_nombre, o.especialidad,
            os.tratamiento_id, t.nombre AS tratamiento_nombre, t.descripcion, t.precio, t.duracion
        FROM odontologo_servicios AS os
        JOIN odontologos AS o ON o.id = os.odontologo_id
        JOIN tratamientos AS t ON t.id = os.tratamiento_id
        WHERE os.fecha_eliminacion IS NULL
        ORDER BY os.id";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, OdontologoServicioDetalle>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, OdontologoServicioDetalle>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active treatments associated with the dentist `odontologo_id`.
pub(crate) async fn find_tratamientos_por_odontologo(
    ex: &mut Executor,
    odontologo_id: i64,
) -> DbResult<Vec<TratamientoResumen>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT t.id, t.nombre, t.descripcion, t.precio, t.duracion
                FROM odontologo_servicios AS os
                JOIN tratamientos AS t ON t.id = os.tratamiento_id
                WHERE os.odontologo_id = $1 AND os.fecha_eliminacion IS NULL
                    AND t.fecha_eliminacion IS NULL
                ORDER BY t.id";
            sqlx::query_as::<_, TratamientoResumen>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT t.id, t.nombre, t.descripcion, t.precio, t.duracion
                FROM odontologo_servicios AS os
                JOIN tratamientos AS t ON t.id = os.tratamiento_id
                WHERE os.odontologo_id = ? AND os.fecha_eliminacion IS NULL
                    AND t.fecha_eliminacion IS NULL
                ORDER BY t.id";
            sqlx::query_as::<_, TratamientoResumen>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Fetches the active treatments *not* yet associated with the dentist `odontologo_id`.
pub(crate) async fn find_tratamientos_disponibles(
    ex: &mut Executor,
    odontologo_id: i64,
) -> DbResult<Vec<Tratamiento>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM tratamientos
                WHERE fecha_eliminacion IS NULL AND id NOT IN (
                    SELECT tratamiento_id FROM odontologo_servicios
                    WHERE odontologo_id = $1 AND fecha_eliminacion IS NULL)
                ORDER BY id";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM tratamientos
                WHERE fecha_eliminacion IS NULL AND id NOT IN (
                    SELECT tratamiento_id FROM odontologo_servicios
                    WHERE odontologo_id = ? AND fecha_eliminacion IS NULL)
                ORDER BY id";
            sqlx::query_as::<_, Tratamiento>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Deletes the association for the given pair.
pub(crate) async fn hard_delete_pair(
    ex: &mut Executor,
    odontologo_id: i64,
    tratamiento_id: i64,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                DELETE FROM odontologo_servicios
                WHERE odontologo_id = $1 AND tratamiento_id = $2 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                DELETE FROM odontologo_servicios
                WHERE odontologo_id = ? AND tratamiento_id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(odontologo_id)
                .bind(tratamiento_id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}
