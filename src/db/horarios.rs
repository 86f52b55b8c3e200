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

//! Database queries to manipulate the weekly schedules of dentists.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, Horario, NuevoHorario};
use sqlx::Row;
use time::OffsetDateTime;

/// Creates a new schedule entry from the pre-validated `datos`.
pub(crate) async fn create(
    ex: &mut Executor,
    datos: NuevoHorario,
    now: OffsetDateTime,
) -> DbResult<Horario> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO horarios
                    (odontologo_id, dia_semana, hora_inicio, hora_fin,
                     fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(datos.odontologo_id)
                .bind(datos.dia_semana)
                .bind(datos.hora_inicio)
                .bind(datos.hora_fin)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO horarios
                    (odontologo_id, dia_semana, hora_inicio, hora_fin,
                     fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(datos.odontologo_id)
                .bind(datos.dia_semana)
                .bind(datos.hora_inicio)
                .bind(datos.hora_fin)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Horario {
        id,
        odontologo_id: datos.odontologo_id,
        dia_semana: datos.dia_semana,
        hora_inicio: datos.hora_inicio,
        hora_fin: datos.hora_fin,
        auditoria,
    })
}

/// Fetches all active schedule entries in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Horario>> {
    let query_str = "SELECT * FROM horarios WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, Horario>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, Horario>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active schedule entry with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Horario> {
    let horario = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM horarios WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Horario>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM horarios WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Horario>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    horario.ok_or(DbError::NotFound)
}

/// Fetches the active schedule entries of the dentist `odontologo_id`, ordered by day and start
/// time.
pub(crate) async fn find_by_odontologo(
    ex: &mut Executor,
    odontologo_id: i64,
) -> DbResult<Vec<Horario>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM horarios
                WHERE odontologo_id = $1 AND fecha_eliminacion IS NULL
                ORDER BY dia_semana, hora_inicio";
            sqlx::query_as::<_, Horario>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM horarios
                WHERE odontologo_id = ? AND fecha_eliminacion IS NULL
                ORDER BY dia_semana, hora_inicio";
            sqlx::query_as::<_, Horario>(query_str)
                .bind(odontologo_id)
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Persists the mutable fields of `horario`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, horario: &Horario) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE horarios
                SET dia_semana = $1, hora_inicio = $2, hora_fin = $3, fecha_modificacion = $4
                WHERE id = $5 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(horario.dia_semana)
                .bind(horario.hora_inicio)
                .bind(horario.hora_fin)
                .bind(horario.auditoria.fecha_modificacion)
                .bind(horario.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE horarios
                SET dia_semana = ?, hora_inicio = ?, hora_fin = ?, fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(horario.dia_semana)
                .bind(horario.hora_inicio)
                .bind(horario.hora_fin)
                .bind(horario.auditoria.fecha_modificacion)
                .bind(horario.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active schedule entry with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE horarios SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE horarios SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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
