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

//! Test utilities for the driver layer.

use crate::clocks::testutils::SettableClock;
use crate::db::sqlite;
use crate::driver::Driver;
use crate::model::{
    NuevaCita, NuevoOdontologo, NuevoPaciente, NuevoTratamiento, Odontologo, Paciente, Password,
    Rol, Tratamiento,
};
use std::sync::Arc;
use time::macros::{date, datetime, time};

/// Default password given to newly-created dentists in tests.
pub(crate) const DEFAULT_PASSWORD: &str = "cambiar.12345";

/// State of a test run against an in-memory database and a settable clock.
pub(crate) struct TestContext {
    /// The driver under test.
    pub(crate) driver: Driver,

    /// The clock injected into the driver.
    pub(crate) clock: Arc<SettableClock>,
}

/// Initializes a driver backed by an in-memory database for testing purposes.
pub(crate) async fn setup() -> TestContext {
    let db = Arc::from(sqlite::testutils::setup().await);
    let clock = Arc::from(SettableClock::new(datetime!(2025-06-01 10:00:00 UTC)));
    let driver =
        Driver::new(db, clock.clone(), Password::new(DEFAULT_PASSWORD).unwrap());
    TestContext { driver, clock }
}

impl TestContext {
    /// Creates a role to satisfy the foreign keys of patients and dentists.
    pub(crate) async fn rol_de_prueba(&self) -> Rol {
        self.driver.clone().crear_rol("paciente".to_owned()).await.unwrap()
    }

    /// Creates a patient with mostly-canned data and the given `email`.
    pub(crate) async fn paciente_de_prueba(&self, email: &str, rol_id: i64) -> Paciente {
        let datos = NuevoPaciente {
            nombre: "Ana García".to_owned(),
            fecha_nacimiento: date!(1990 - 04 - 15),
            telefono: "555-0101".to_owned(),
            email: email.into(),
            rol_id,
        };
        self.driver.clone().crear_paciente(datos, Some(Password::from("NuevaPass1"))).await.unwrap()
    }

    /// Creates a dentist with mostly-canned data and the given `nombre`.
    pub(crate) async fn odontologo_de_prueba(&self, nombre: &str, rol_id: i64) -> Odontologo {
        let datos = NuevoOdontologo {
            nombre: nombre.to_owned(),
            especialidad: "Ortodoncia".to_owned(),
            telefono: "555-0202".to_owned(),
            rol_id,
        };
        self.driver.clone().crear_odontologo(datos).await.unwrap()
    }

    /// Creates a treatment with mostly-canned data and the given `descripcion`.
    pub(crate) async fn tratamiento_de_prueba(&self, descripcion: &str) -> Tratamiento {
        let datos = NuevoTratamiento {
            nombre: "Limpieza".to_owned(),
            descripcion: descripcion.to_owned(),
            precio: 50.0,
            duracion: 30,
        };
        self.driver.clone().crear_tratamiento(datos).await.unwrap()
    }

    /// Creates a role, a patient, a dentist and a treatment, and returns an appointment request
    /// that links them at a canned date and time.
    pub(crate) async fn datos_de_cita(&self) -> NuevaCita {
        let rol = self.rol_de_prueba().await;
        let paciente = self.paciente_de_prueba("ana@example.com", rol.id).await;
        let odontologo = self.odontologo_de_prueba("Dra. Pérez", rol.id).await;
        let tratamiento = self.tratamiento_de_prueba("Limpieza dental completa").await;
        NuevaCita {
            id_paciente: paciente.id,
            id_odontologo: odontologo.id,
            id_tratamiento: tratamiento.id,
            fecha: date!(2025 - 07 - 01),
            hora: time!(10:00),
            estado: "pendiente".to_owned(),
            motivo: None,
        }
    }
}
