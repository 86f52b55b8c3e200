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

//! Database queries to manipulate appointments.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, Cita, NuevaCita};
use sqlx::Row;
use time::{Date, OffsetDateTime, Time};

/// Creates a new appointment from the pre-validated `datos`.
pub(crate) async fn create(ex: &mut Executor, datos: NuevaCita, now: OffsetDateTime) -> DbResult<Cita> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO citas
                    (id_paciente, id_odontologo, id_tratamiento, fecha, hora, estado, motivo,
                     fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(datos.id_paciente)
                .bind(datos.id_odontologo)
                .bind(datos.id_tratamiento)
                .bind(datos.fecha)
                .bind(datos.hora)
                .bind(&datos.estado)
                .bind(&datos.motivo)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO citas
                    (id_paciente, id_odontologo, id_tratamiento, fecha, hora, estado, motivo,
                     fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(datos.id_paciente)
                .bind(datos.id_odontologo)
                .bind(datos.id_tratamiento)
                .bind(datos.fecha)
                .bind(datos.hora)
                .bind(&datos.estado)
                .bind(&datos.motivo)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Cita {
        id,
        id_paciente: datos.id_paciente,
        id_odontologo: datos.id_odontologo,
        id_tratamiento: datos.id_tratamiento,
        fecha: datos.fecha,
        hora: datos.hora,
        estado: datos.estado,
        motivo: datos.motivo,
        auditoria,
    })
}

/// Fetches all active appointments in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Cita>> {
    let query_str = "SELECT * FROM citas WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query_as::<_, Cita>(query_str).fetch_all(ex).await.map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            sqlx::query_as::<_, Cita>(query_str).fetch_all(ex).await.map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Fetches the active appointment with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Cita> {
    let cita = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM citas WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Cita>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM citas WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Cita>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    cita.ok_or(DbError::NotFound)
}

/// Checks if a dentist already has an active appointment at the given date and time.
///
/// `excluir_id` leaves one appointment out of the search, which callers use to let an update
/// keep its own slot.
pub(crate) async fn exists_activa(
    ex: &mut Executor,
    id_odontologo: i64,
    fecha: Date,
    hora: Time,
    excluir_id: Option<i64>,
) -> DbResult<bool> {
    let count: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM citas
                WHERE id_odontologo = $1 AND fecha = $2 AND hora = $3
                    AND fecha_eliminacion IS NULL AND ($4::BIGINT IS NULL OR id != $4)";
            let row = sqlx::query(query_str)
                .bind(id_odontologo)
                .bind(fecha)
                .bind(hora)
                .bind(excluir_id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM citas
                WHERE id_odontologo = ?1 AND fecha = ?2 AND hora = ?3
                    AND fecha_eliminacion IS NULL AND (?4 IS NULL OR id != ?4)";
            let row = sqlx::query(query_str)
                .bind(id_odontologo)
                .bind(fecha)
                .bind(hora)
                .bind(excluir_id)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }
    };
    Ok(count > 0)
}

/// Persists the mutable fields of `cita`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, cita: &Cita) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE citas
                SET id_paciente = $1, id_odontologo = $2, id_tratamiento = $3, fecha = $4,
                    hora = $5, estado = $6, motivo = $7, fecha_modificacion = $8
                WHERE id = $9 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(cita.id_paciente)
                .bind(cita.id_odontologo)
                .bind(cita.id_tratamiento)
                .bind(cita.fecha)
                .bind(cita.hora)
                .bind(&cita.estado)
                .bind(&cita.motivo)
                .bind(cita.auditoria.fecha_modificacion)
                .bind(cita.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE citas
                SET id_paciente = ?, id_odontologo = ?, id_tratamiento = ?, fecha = ?,
                    hora = ?, estado = ?, motivo = ?, fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(cita.id_paciente)
                .bind(cita.id_odontologo)
                .bind(cita.id_tratamiento)
                .bind(cita.fecha)
                .bind(cita.hora)
                .bind(&cita.estado)
                .bind(&cita.motivo)
                .bind(cita.auditoria.fecha_modificacion)
                .bind(cita.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active appointment with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE citas SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE citas SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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
