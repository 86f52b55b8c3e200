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

//! Operations on the associations between dentists and the treatments they can perform.

use crate::db::{odontologo_servicios, odontologos, tratamientos, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{OdontologoServicio, OdontologoServicioDetalle, Tratamiento, TratamientoResumen};

impl Driver {
    /// Associates the treatment `tratamiento_id` with the dentist `odontologo_id`.
    pub(crate) async fn crear_odontologo_servicio(
        self,
        odontologo_id: i64,
        tratamiento_id: i64,
    ) -> DriverResult<OdontologoServicio> {
        let mut ex = self.db.ex().await?;

        verificar_odontologo(&mut ex, odontologo_id).await?;
        tratamientos::find_one(&mut ex, tratamiento_id).await.map_err(|e| match e {
            DbError::NotFound => DriverError::NotFound(format!(
                "El tratamiento con id {} no existe",
                tratamiento_id
            )),
            e => e.into(),
        })?;

        if odontologo_servicios::get_by_pair(&mut ex, odontologo_id, tratamiento_id)
            .await?
            .is_some()
        {
            return Err(DriverError::AlreadyExists(
                "El odontólogo ya tiene asignado ese tratamiento".to_owned(),
            ));
        }

        Ok(odontologo_servicios::create(&mut ex, odontologo_id, tratamiento_id, self.clock.now_utc())
            .await?)
    }

    /// Returns the active association with the given `id`.
    pub(crate) async fn find_odontologo_servicio(
        self,
        id: i64,
    ) -> DriverResult<OdontologoServicio> {
        let mut ex = self.db.ex().await?;
        odontologo_servicios::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))
    }

    /// Replaces the treatment referenced by the association with the given `id` and returns
    /// the updated association.
    pub(crate) async fn actualizar_odontologo_servicio(
        self,
        id: i64,
        tratamiento_id: Option<i64>,
    ) -> DriverResult<OdontologoServicio> {
        let mut ex = self.db.ex().await?;
        let mut asociacion =
            odontologo_servicios::find_one(&mut ex, id).await.map_err(|e| no_existe(id, e))?;

        if let Some(tratamiento_id) = tratamiento_id {
            if tratamiento_id != asociacion.tratamiento_id {
                tratamientos::find_one(&mut ex, tratamiento_id).await.map_err(|e| match e {
                    DbError::NotFound => DriverError::NotFound(format!(
                        "El tratamiento con id {} no existe",
                        tratamiento_id
                    )),
                    e => e.into(),
                })?;
                if odontologo_servicios::get_by_pair(
                    &mut ex,
                    asociacion.odontologo_id,
                    tratamiento_id,
                )
                .await?
                .is_some()
                {
                    return Err(DriverError::AlreadyExists(
                        "El odontólogo ya tiene asignado ese tratamiento".to_owned(),
                    ));
                }
                asociacion.tratamiento_id = tratamiento_id;
            }
        }
        asociacion.auditoria.fecha_modificacion = self.clock.now_utc();

        odontologo_servicios::update(&mut ex, &asociacion).await?;
        Ok(asociacion)
    }

    /// Soft-deletes the association with the given `id`.
    pub(crate) async fn eliminar_odontologo_servicio(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        odontologo_servicios::soft_delete(&mut ex, id, self.clock.now_utc())
            .await
            .map_err(|e| no_existe(id, e))
    }

    /// Returns all active associations joined with the entities they reference.
    pub(crate) async fn find_odontologo_servicios(
        self,
    ) -> DriverResult<Vec<OdontologoServicioDetalle>> {
        let mut ex = self.db.ex().await?;
        Ok(odontologo_servicios::find_all_detalle(&mut ex).await?)
    }

    /// Returns the treatments associated with the dentist `odontologo_id`.
    pub(crate) async fn find_servicios_de_odontologo(
        self,
        odontologo_id: i64,
    ) -> DriverResult<Vec<TratamientoResumen>> {
        let mut ex = self.db.ex().await?;
        verificar_odontologo(&mut ex, odontologo_id).await?;
        Ok(odontologo_servicios::find_tratamientos_por_odontologo(&mut ex, odontologo_id).await?)
    }

    /// Returns the treatments *not* yet associated with the dentist `odontologo_id`.
    pub(crate) async fn find_servicios_disponibles(
        self,
        odontologo_id: i64,
    ) -> DriverResult<Vec<Tratamiento>> {
        let mut ex = self.db.ex().await?;
        verificar_odontologo(&mut ex, odontologo_id).await?;
        Ok(odontologo_servicios::find_tratamientos_disponibles(&mut ex, odontologo_id).await?)
    }

    /// Removes the association between the dentist `odontologo_id` and the treatment
    /// `tratamiento_id`, identified by its natural pair.
    ///
    /// This path hard-deletes the row so that the pair can be associated again later.
    pub(crate) async fn eliminar_relacion(
        self,
        odontologo_id: i64,
        tratamiento_id: i64,
    ) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        odontologo_servicios::hard_delete_pair(&mut ex, odontologo_id, tratamiento_id)
            .await
            .map_err(|e| match e {
                DbError::NotFound => DriverError::NotFound(format!(
                    "El odontólogo {} no tiene asignado el tratamiento {}",
                    odontologo_id, tratamiento_id
                )),
                e => e.into(),
            })
    }
}

/// Rewrites a `NotFound` database error into a message that names the association `id`.
fn no_existe(id: i64, e: DbError) -> DriverError {
    match e {
        DbError::NotFound => {
            DriverError::NotFound(format!("La asociación con id {} no existe", id))
        }
        e => e.into(),
    }
}

/// Ensures that the dentist `odontologo_id` exists and is active.
async fn verificar_odontologo(
    ex: &mut crate::db::Executor,
    odontologo_id: i64,
) -> DriverResult<()> {
    odontologos::find_one(ex, odontologo_id).await.map_err(|e| match e {
        DbError::NotFound => {
            DriverError::NotFound(format!("El odontólogo con id {} no existe", odontologo_id))
        }
        e => e.into(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::driver::testutils::*;
    use crate::driver::DriverError;

    #[tokio::test]
    async fn test_crear_y_listar() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = context.tratamiento_de_prueba("Limpieza dental completa").await;

        let servicio = context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
            .unwrap();
        assert_eq!(odontologo.id, servicio.odontologo_id);
        assert_eq!(tratamiento.id, servicio.tratamiento_id);

        let detalle = context.driver.clone().find_odontologo_servicios().await.unwrap();
        assert_eq!(1, detalle.len());
        assert_eq!("Dra. Pérez", detalle[0].odontologo_nombre);
        assert_eq!(tratamiento.nombre, detalle[0].tratamiento_nombre);
    }

    #[tokio::test]
    async fn test_crear_rechaza_referencias_inexistentes() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = context.tratamiento_de_prueba("Limpieza dental completa").await;

        match context.driver.clone().crear_odontologo_servicio(999, tratamiento.id).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("odontólogo")),
            e => panic!("{:?}", e),
        }
        match context.driver.clone().crear_odontologo_servicio(odontologo.id, 999).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("tratamiento")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_crear_par_duplicado() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = context.tratamiento_de_prueba("Limpieza dental completa").await;

        context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
            .unwrap();
        match context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
        {
            Err(DriverError::AlreadyExists(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_asignados_y_disponibles() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let limpieza = context.tratamiento_de_prueba("Limpieza dental completa").await;
        let blanqueo = context.tratamiento_de_prueba("Blanqueamiento").await;

        context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, limpieza.id)
            .await
            .unwrap();

        let asignados =
            context.driver.clone().find_servicios_de_odontologo(odontologo.id).await.unwrap();
        assert_eq!(1, asignados.len());
        assert_eq!(limpieza.id, asignados[0].id);

        let disponibles =
            context.driver.clone().find_servicios_disponibles(odontologo.id).await.unwrap();
        assert_eq!(vec![blanqueo], disponibles);

        match context.driver.clone().find_servicios_de_odontologo(999).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_eliminar_relacion() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = context.tratamiento_de_prueba("Limpieza dental completa").await;

        match context
            .driver
            .clone()
            .eliminar_relacion(odontologo.id, tratamiento.id)
            .await
        {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }

        context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
            .unwrap();
        context
            .driver
            .clone()
            .eliminar_relacion(odontologo.id, tratamiento.id)
            .await
            .unwrap();

        // The association can be re-created after deletion.
        context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_actualizar_cambia_el_tratamiento() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let limpieza = context.tratamiento_de_prueba("Limpieza dental completa").await;
        let blanqueo = context.tratamiento_de_prueba("Blanqueamiento").await;

        let servicio = context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, limpieza.id)
            .await
            .unwrap();

        let actualizado = context
            .driver
            .clone()
            .actualizar_odontologo_servicio(servicio.id, Some(blanqueo.id))
            .await
            .unwrap();
        assert_eq!(blanqueo.id, actualizado.tratamiento_id);
        assert_eq!(
            actualizado,
            context.driver.clone().find_odontologo_servicio(servicio.id).await.unwrap()
        );

        match context
            .driver
            .clone()
            .actualizar_odontologo_servicio(servicio.id, Some(999))
            .await
        {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("tratamiento")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_actualizar_rechaza_par_duplicado() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let limpieza = context.tratamiento_de_prueba("Limpieza dental completa").await;
        let blanqueo = context.tratamiento_de_prueba("Blanqueamiento").await;

        let servicio = context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, limpieza.id)
            .await
            .unwrap();
        context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, blanqueo.id)
            .await
            .unwrap();

        match context
            .driver
            .clone()
            .actualizar_odontologo_servicio(servicio.id, Some(blanqueo.id))
            .await
        {
            Err(DriverError::AlreadyExists(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_eliminar_por_id() {
        let context = setup().await;
        let rol = context.rol_de_prueba().await;
        let odontologo = context.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = context.tratamiento_de_prueba("Limpieza dental completa").await;

        let servicio = context
            .driver
            .clone()
            .crear_odontologo_servicio(odontologo.id, tratamiento.id)
            .await
            .unwrap();

        context.driver.clone().eliminar_odontologo_servicio(servicio.id).await.unwrap();
        match context.driver.clone().find_odontologo_servicio(servicio.id).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
        match context.driver.clone().eliminar_odontologo_servicio(servicio.id).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
    }
}
