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

//! Database queries to manipulate dentists.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, HashedPassword, NuevoOdontologo, Odontologo};
use sqlx::Row;
use time::OffsetDateTime;

/// Creates a new dentist from the pre-validated `datos`.
///
/// Dentists may exist without a password until they claim their account, hence the optional
/// `password`.
pub(crate) async fn create(
    ex: &mut Executor,
    datos: NuevoOdontologo,
    password: Option<HashedPassword>,
    now: OffsetDateTime,
) -> DbResult<Odontologo> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO odontologos
                    (nombre, especialidad, telefono, password, rol_id,
                     fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(&datos.especialidad)
                .bind(&datos.telefono)
                .bind(password.as_ref().map(HashedPassword::as_str))
                .bind(datos.rol_id)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO odontologos
                    (nombre, especialidad, telefono, password, rol_id,
                     fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(&datos.especialidad)
                .bind(&datos.telefono)
                .bind(password.as_ref().map(HashedPassword::as_str))
                .bind(datos.rol_id)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Odontologo {
        id,
        nombre: datos.nombre,
        especialidad: datos.especialidad,
        telefono: datos.telefono,
        rol_id: datos.rol_id,
        auditoria,
    })
}

/// Fetches all active dentists in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Odontologo>> {
    let query_str = "SELECT * FROM odontologos WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, Odontologo>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, Odontologo>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active dentist with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Odontologo> {
    let odontologo = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM odontologos WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Odontologo>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM odontologos WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Odontologo>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    odontologo.ok_or(DbError::NotFound)
}

/// Fetches the active dentist with the given `nombre`, if any.
pub(crate) async fn get_by_nombre(ex: &mut Executor, nombre: &str) -> DbResult<Option<Odontologo>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM odontologos WHERE nombre = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Odontologo>(query_str)
                .bind(nombre)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT * FROM odontologos WHERE nombre = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Odontologo>(query_str)
                .bind(nombre)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Persists the mutable fields of `odontologo`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, odontologo: &Odontologo) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE odontologos
                SET nombre = $1, especialidad = $2, telefono = $3, rol_id = $4,
                    fecha_modificacion = $5
                WHERE id = $6 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&odontologo.nombre)
                .bind(&odontologo.especialidad)
                .bind(&odontologo.telefono)
                .bind(odontologo.rol_id)
                .bind(odontologo.auditoria.fecha_modificacion)
                .bind(odontologo.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE odontologos
                SET nombre = ?, especialidad = ?, telefono = ?, rol_id = ?,
                    fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&odontologo.nombre)
                .bind(&odontologo.especialidad)
                .bind(&odontologo.telefono)
                .bind(odontologo.rol_id)
                .bind(odontologo.auditoria.fecha_modificacion)
                .bind(odontologo.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active dentist with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE odontologos SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE odontologos SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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

/// Gets the password hash of the active dentist with the given `id`, or `None` if the dentist
/// exists but has not claimed the account yet.
pub(crate) async fn get_password(ex: &mut Executor, id: i64) -> DbResult<Option<HashedPassword>> {
    let raw: Option<Option<String>> = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT password FROM odontologos WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .map(|row| row.try_get("password").map_err(postgres::map_sqlx_error))
                .transpose()?
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT password FROM odontologos WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .map(|row| row.try_get("password").map_err(sqlite::map_sqlx_error))
                .transpose()?
        }
    };
    match raw {
        Some(password) => Ok(password.map(HashedPassword::new)),
        None => Err(DbError::NotFound),
    }
}

/// Replaces the password hash of the active dentist with the given `id`.
pub(crate) async fn set_password(
    ex: &mut Executor,
    id: i64,
    password: HashedPassword,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE odontologos SET password = $1, fecha_modificacion = $2
                WHERE id = $3 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(password.as_str())
                .bind(now)
                .bind(id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE odontologos SET password = ?, fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(password.as_str())
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
