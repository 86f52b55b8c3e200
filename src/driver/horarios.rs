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

//! Operations on the weekly schedules of dentists.

use crate::db::{horarios, odontologos, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{ActualizacionHorario, Horario, NuevoHorario};
use time::Time;

/// Ensures that an attendance slot starts before it ends.
fn validar_rango(hora_inicio: Time, hora_fin: Time) -> DriverResult<()> {
    if hora_inicio >= hora_fin {
        return Err(DriverError::InvalidInput(
            "La hora de inicio debe ser anterior a la hora de fin".to_owned(),
        ));
    }
    Ok(())
}

impl Driver {
    /// Creates a new schedule entry.
    pub(crate) async fn crear_horario(self, datos: NuevoHorario) -> DriverResult<Horario> {
        validar_rango(datos.hora_inicio, datos.hora_fin)?;

        let mut ex = self.db.ex().await?;
        odontologos::find_one(&mut ex, datos.odontologo_id).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El odontólogo con id {} no existe",
                datos.odontologo_id
            )),
            e => e.into(),
        })?;

        Ok(horarios::create(&mut ex, datos, self.clock.now_utc()).await?)
    }

    /// Returns all active schedule entries.
    pub(crate) async fn find_horarios(self) -> DriverResult<Vec<Horario>> {
        let mut ex = self.db.ex().await?;
        Ok(horarios::find_all(&mut ex).await?)
    }

    /// Returns the active schedule entry with the given `id`.
    pub(crate) async fn find_horario(self, id: i64) -> DriverResult<Horario> {
        let mut ex = self.db.ex().await?;
        horarios::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Returns the active schedule entries of the dentist `odontologo_id`.
    pub(crate) async fn find_horarios_de_odontologo(
        self,
        odontologo_id: i64,
    ) -> DriverResult<Vec<Horario>> {
        let mut ex = self.db.ex().await?;
        odontologos::find_one(&mut ex, odontologo_id).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El odontólogo con id {} no existe",
                odontologo_id
            )),
            e => e.into(),
        })?;
        Ok(horarios::find_by_odontologo(&mut ex, odontologo_id).await?)
    }

    /// Applies the partial update `cambios` to the schedule entry with the given `id` and
    /// returns the updated entity.
    pub(crate) async fn actualizar_horario(
        self,
        id: i64,
        cambios: ActualizacionHorario,
    ) -> DriverResult<Horario> {
        let mut ex = self.db.ex().await?;
        let mut horario = horarios::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(dia_semana) = cambios.dia_semana {
            horario.dia_semana = dia_semana;
        }
        if let Some(hora_inicio) = cambios.hora_inicio {
            horario.hora_inicio = hora_inicio;
        }
        if let Some(hora_fin) = cambios.hora_fin {
            horario.hora_fin = hora_fin;
        }
        validar_rango(horario.hora_inicio, horario.hora_fin)?;
        horario.auditoria.fecha_modificacion = self.clock.now_utc();

        horarios::update(&mut ex, &horario).await?;
        Ok(horario)
    }

    /// Soft-deletes the schedule entry with the given `id`.
    pub(crate) async fn eliminar_horario(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        horarios::soft_delete(&mut ex, id, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(id, e))
    }
}

/// Rewrites a `NotFound` database error into a message that names the schedule entry `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound(format!("El horario con id {} no existe", id)),
        e => e.into(),
    }
}
