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

//! Operations on appointments.
//!
//! Creating or rescheduling an appointment verifies that all referenced entities are active and
//! that the dentist does not already have an appointment in the same slot.  The checks and the
//! write are not atomic, which mirrors the behavior of the rest of the service: concurrent
//! requests may race, and the last write wins.

use crate::db::{citas, odontologos, pacientes, tratamientos, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{ActualizacionCita, Cita, NuevaCita};

impl Driver {
    /// Creates a new appointment.
    pub(crate) async fn crear_cita(self, datos: NuevaCita) -> DriverResult<Cita> {
        let mut ex = self.db.ex().await?;

        pacientes::find_one(&mut ex, datos.id_paciente).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El paciente con id {} no existe",
                datos.id_paciente
            )),
            e => e.into(),
        })?;
        odontologos::find_one(&mut ex, datos.id_odontologo).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El odontólogo con id {} no existe",
                datos.id_odontologo
            )),
            e => e.into(),
        })?;
        tratamientos::find_one(&mut ex, datos.id_tratamiento).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El tratamiento con id {} no existe",
                datos.id_tratamiento
            )),
            e => e.into(),
        })?;

        if citas::exists_activa(&mut ex, datos.id_odontologo, datos.fecha, datos.hora, None).await?
        {
            return Err(DriverError::AlreadyExists(
                "El odontólogo ya tiene una cita en esa fecha y hora".to_owned(),
            ));
        }

        Ok(citas::create(&mut ex, datos, self.clock.now_utc()).await?)
    }

    /// Returns all active appointments.
    pub(crate) async fn find_citas(self) -> DriverResult<Vec<Cita>> {
        let mut ex = self.db.ex().await?;
        Ok(citas::find_all(&mut ex).await?)
    }

    /// Returns the active appointment with the given `id`.
    pub(crate) async fn find_cita(self, id: i64) -> DriverResult<Cita> {
        let mut ex = self.db.ex().await?;
        citas::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Applies the partial update `cambios` to the appointment with the given `id` and returns
    /// the updated entity.
    pub(crate) async fn actualizar_cita(
        self,
        id: i64,
        cambios: ActualizacionCita,
    ) -> DriverResult<Cita> {
        let mut ex = self.db.ex().await?;
        let mut cita = citas::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(id_paciente) = cambios.id_paciente {
            pacientes::find_one(&mut ex, id_paciente).await.map_err(|e| match e {
                DbError::NotFound => DriverError::NotFound(format!(
                    "El paciente con id {} no existe",
                    id_paciente
                )),
                e => e.into(),
            })?;
            cita.id_paciente = id_paciente;
        }
        if let Some(id_odontologo) = cambios.id_odontologo {
            odontologos::find_one(&mut ex, id_odontologo).await.map_err(|e| match e {
                DbError::NotFound => DriverError::NotFound(format!(
                    "El odontólogo con id {} no existe",
                    id_odontologo
                )),
                e => e.into(),
            })?;
            cita.id_odontologo = id_odontologo;
        }
        if let Some(id_tratamiento) = cambios.id_tratamiento {
            tratamientos::find_one(&mut ex, id_tratamiento).await.map_err(|e| match e {
                DbError::NotFound => DriverError::NotFound(format!(
                    "El tratamiento con id {} no existe",
                    id_tratamiento
                )),
                e => e.into(),
            })?;
            cita.id_tratamiento = id_tratamiento;
        }
        if let Some(fecha) = cambios.fecha {
            cita.fecha = fecha;
        }
        if let Some(hora) = cambios.hora {
            cita.hora = hora;
        }
        if let Some(estado) = cambios.estado {
            cita.estado = estado;
        }
        if let Some(motivo) = cambios.motivo {
            cita.motivo = Some(motivo);
        }

        // Excluding the appointment itself lets an update keep its current slot.
        if citas::exists_activa(&mut ex, cita.id_odontologo, cita.fecha, cita.hora, Some(id))
            .await?
        {
            return Err(DriverError::AlreadyExists(
                "El odontólogo ya tiene una cita en esa fecha y hora".to_owned(),
            ));
        }

        cita.auditoria.fecha_modificacion = self.clock.now_utc();
        citas::update(&mut ex, &cita).await?;
        Ok(cita)
    }

    /// Soft-deletes the appointment with the given `id`.
    pub(crate) async fn eliminar_cita(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        citas::soft_delete(&mut ex, id, self.clock.now_utc()).await.map_err(|e| no_existe(id, e))
    }
}

/// Rewrites a `NotFound` database error into a message that names the appointment `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound(format!("La cita con id {} no existe", id)),
        e => e.into(),
    }
}
