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

//! Database queries to manipulate patients.
//!
//! The password hash of a patient lives in the `pacientes` table but is never part of the
//! `Paciente` model type, so the queries that touch it are separate.

use crate::db::{ensure_one_modified, postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Auditoria, HashedPassword, NuevoPaciente, Paciente};
use sqlx::Row;
use time::OffsetDateTime;

/// Creates a new patient from the pre-validated `datos` and a hashed `password`.
pub(crate) async fn create(
    ex: &mut Executor,
    datos: NuevoPaciente,
    password: HashedPassword,
    now: OffsetDateTime,
) -> DbResult<Paciente> {
    let auditoria = Auditoria::nueva(now);
    let id: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO pacientes
                    (nombre, fecha_nacimiento, telefono, email, password, rol_id,
                     fecha_creacion, fecha_modificacion)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(datos.fecha_nacimiento)
                .bind(&datos.telefono)
                .bind(datos.email.as_str())
                .bind(password.as_str())
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
                INSERT INTO pacientes
                    (nombre, fecha_nacimiento, telefono, email, password, rol_id,
                     fecha_creacion, fecha_modificacion)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&datos.nombre)
                .bind(datos.fecha_nacimiento)
                .bind(&datos.telefono)
                .bind(datos.email.as_str())
                .bind(password.as_str())
                .bind(datos.rol_id)
                .bind(auditoria.fecha_creacion)
                .bind(auditoria.fecha_modificacion)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }
    };

    Ok(Paciente {
        id,
        nombre: datos.nombre,
        fecha_nacimiento: datos.fecha_nacimiento,
        telefono: datos.telefono,
        email: datos.email.as_str().to_owned(),
        rol_id: datos.rol_id,
        auditoria,
    })
}

/// Fetches all active patients in creation order.
pub(crate) async fn find_all(ex: &mut Executor) -> DbResult<Vec<Paciente>> {
    let query_str = "SELECT * FROM pacientes WHERE fecha_eliminacion IS NULL ORDER BY id";
    match ex {
        Executor::Postgres(ex) => sqlx::query_as::<_, Paciente>(query_str)
            .fetch_all(ex)
            .await
            .map_err(postgres::map_sqlx_error),

        Executor::Sqlite(ex) => sqlx::query_as::<_, Paciente>(query_str)
            .fetch_all(ex)
            .await
            .map_err(sqlite::map_sqlx_error),
    }
}

/// Fetches the active patient with the given `id`.
pub(crate) async fn find_one(ex: &mut Executor, id: i64) -> DbResult<Paciente> {
    let paciente = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM pacientes WHERE id = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Paciente>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM pacientes WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Paciente>(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
        }
    };
    paciente.ok_or(DbError::NotFound)
}

/// Fetches the active patient with the given `email`, if any.
pub(crate) async fn get_by_email(ex: &mut Executor, email: &str) -> DbResult<Option<Paciente>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT * FROM pacientes WHERE email = $1 AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Paciente>(query_str)
                .bind(email)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM pacientes WHERE email = ? AND fecha_eliminacion IS NULL";
            sqlx::query_as::<_, Paciente>(query_str)
                .bind(email)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Persists the mutable fields of `paciente`, which must carry an already-updated
/// `fecha_modificacion`.
pub(crate) async fn update(ex: &mut Executor, paciente: &Paciente) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE pacientes
                SET nombre = $1, fecha_nacimiento = $2, telefono = $3, email = $4, rol_id = $5,
                    fecha_modificacion = $6
                WHERE id = $7 AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&paciente.nombre)
                .bind(paciente.fecha_nacimiento)
                .bind(&paciente.telefono)
                .bind(&paciente.email)
                .bind(paciente.rol_id)
                .bind(paciente.auditoria.fecha_modificacion)
                .bind(paciente.id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE pacientes
                SET nombre = ?, fecha_nacimiento = ?, telefono = ?, email = ?, rol_id = ?,
                    fecha_modificacion = ?
                WHERE id = ? AND fecha_eliminacion IS NULL";
            let done = sqlx::query(query_str)
                .bind(&paciente.nombre)
                .bind(paciente.fecha_nacimiento)
                .bind(&paciente.telefono)
                .bind(&paciente.email)
                .bind(paciente.rol_id)
                .bind(paciente.auditoria.fecha_modificacion)
                .bind(paciente.id)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };
    ensure_one_modified(rows_affected)
}

/// Soft-deletes the active patient with the given `id`.
pub(crate) async fn soft_delete(ex: &mut Executor, id: i64, now: OffsetDateTime) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE pacientes SET fecha_eliminacion = $1, fecha_modificacion = $1
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
                UPDATE pacientes SET fecha_eliminacion = ?1, fecha_modificacion = ?1
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

/// Gets the password hash of the active patient with the given `id`.
pub(crate) async fn get_password(ex: &mut Executor, id: i64) -> DbResult<HashedPassword> {
    let raw: Option<String> = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT password FROM pacientes WHERE id = $1 AND fecha_eliminacion IS NULL";
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
                "SELECT password FROM pacientes WHERE id = ? AND fecha_eliminacion IS NULL";
            sqlx::query(query_str)
                .bind(id)
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .map(|row| row.try_get("password").map_err(sqlite::map_sqlx_error))
                .transpose()?
        }
    };
    raw.map(HashedPassword::new).ok_or(DbError::NotFound)
}

/// Replaces the password hash of the active patient with the given `id`.
pub(crate) async fn set_password(
    ex: &mut Executor,
    id: i64,
    password: HashedPassword,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE pacientes SET password = $1, fecha_modificacion = $2
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
                UPDATE pacientes SET password = ?, fecha_modificacion = ?
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
