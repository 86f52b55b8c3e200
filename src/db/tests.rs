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

//! Tests for the database queries against an in-memory SQLite database.

use crate::db::sqlite::testutils::setup;
use crate::db::*;
use crate::model::*;
use time::macros::{date, datetime, time};
use time::OffsetDateTime;

/// Creation time used by most tests.
const NOW: OffsetDateTime = datetime!(2025-06-01 10:00:00 UTC);

/// A later time, for operations that must observe a distinct modification time.
const LATER: OffsetDateTime = datetime!(2025-06-02 12:30:00 UTC);

/// Creates a role to satisfy the foreign keys of patients and dentists.
async fn crear_rol(ex: &mut Executor) -> Rol {
    roles::create(ex, "paciente".to_owned(), NOW).await.unwrap()
}

/// Creates a patient with mostly-canned data and the given `email`.
async fn crear_paciente(ex: &mut Executor, email: &str, rol_id: i64) -> Paciente {
    let datos = NuevoPaciente {
        nombre: "Ana García".to_owned(),
        fecha_nacimiento: date!(1990 - 04 - 15),
        telefono: "555-0101".to_owned(),
        email: EmailAddress::from(email),
        rol_id,
    };
    pacientes::create(ex, datos, HashedPassword::new("hash"), NOW).await.unwrap()
}

/// Creates a dentist with mostly-canned data and the given `nombre`.
async fn crear_odontologo(ex: &mut Executor, nombre: &str, rol_id: i64) -> Odontologo {
    let datos = NuevoOdontologo {
        nombre: nombre.to_owned(),
        especialidad: "Ortodoncia".to_owned(),
        telefono: "555-0202".to_owned(),
        rol_id,
    };
    odontologos::create(ex, datos, None, NOW).await.unwrap()
}

/// Creates a treatment with mostly-canned data and the given `descripcion`.
async fn crear_tratamiento(ex: &mut Executor, descripcion: &str) -> Tratamiento {
    let datos = NuevoTratamiento {
        nombre: "Limpieza".to_owned(),
        descripcion: descripcion.to_owned(),
        precio: 50.0,
        duracion: 30,
    };
    tratamientos::create(ex, datos, NOW).await.unwrap()
}

#[tokio::test]
async fn test_pacientes_create_and_find() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    assert_eq!(NOW, paciente.auditoria.fecha_creacion);
    assert_eq!(None, paciente.auditoria.fecha_eliminacion);

    assert_eq!(paciente, pacientes::find_one(&mut ex, paciente.id).await.unwrap());
    assert_eq!(vec![paciente], pacientes::find_all(&mut ex).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_pacientes_find_one_missing() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    assert_eq!(DbError::NotFound, pacientes::find_one(&mut ex, 123).await.unwrap_err());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_pacientes_email_unique_among_active() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;

    let datos = NuevoPaciente {
        nombre: "Otra Ana".to_owned(),
        fecha_nacimiento: date!(1985 - 01 - 01),
        telefono: "555-0303".to_owned(),
        email: EmailAddress::from("ana@example.com"),
        rol_id: rol.id,
    };
    match pacientes::create(&mut ex, datos, HashedPassword::new("hash"), NOW).await {
        Err(DbError::AlreadyExists) => (),
        e => panic!("{:?}", e),
    }

    // Soft-deleting the first patient frees up the email.
    pacientes::soft_delete(&mut ex, paciente.id, LATER).await.unwrap();
    crear_paciente(&mut ex, "ana@example.com", rol.id).await;

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_pacientes_update() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let mut paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    paciente.telefono = "555-9999".to_owned();
    paciente.auditoria.fecha_modificacion = LATER;
    pacientes::update(&mut ex, &paciente).await.unwrap();

    assert_eq!(paciente, pacientes::find_one(&mut ex, paciente.id).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_pacientes_soft_delete_hides_but_preserves_credentials_lookup_failure() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    pacientes::soft_delete(&mut ex, paciente.id, LATER).await.unwrap();

    assert_eq!(DbError::NotFound, pacientes::find_one(&mut ex, paciente.id).await.unwrap_err());
    assert!(pacientes::find_all(&mut ex).await.unwrap().is_empty());
    assert_eq!(None, pacientes::get_by_email(&mut ex, "ana@example.com").await.unwrap());
    assert_eq!(DbError::NotFound, pacientes::get_password(&mut ex, paciente.id).await.unwrap_err());

    // Deleting twice must not find the row again.
    assert_eq!(
        DbError::NotFound,
        pacientes::soft_delete(&mut ex, paciente.id, LATER).await.unwrap_err()
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_pacientes_passwords() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    assert_eq!(
        HashedPassword::new("hash"),
        pacientes::get_password(&mut ex, paciente.id).await.unwrap()
    );

    pacientes::set_password(&mut ex, paciente.id, HashedPassword::new("hash2"), LATER)
        .await
        .unwrap();
    assert_eq!(
        HashedPassword::new("hash2"),
        pacientes::get_password(&mut ex, paciente.id).await.unwrap()
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologos_nombre_unique_among_active() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;

    let datos = NuevoOdontologo {
        nombre: "Dra. Pérez".to_owned(),
        especialidad: "Endodoncia".to_owned(),
        telefono: "555-0404".to_owned(),
        rol_id: rol.id,
    };
    match odontologos::create(&mut ex, datos, None, NOW).await {
        Err(DbError::AlreadyExists) => (),
        e => panic!("{:?}", e),
    }

    odontologos::soft_delete(&mut ex, odontologo.id, LATER).await.unwrap();
    crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologos_password_starts_unset() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    assert_eq!(None, odontologos::get_password(&mut ex, odontologo.id).await.unwrap());

    odontologos::set_password(&mut ex, odontologo.id, HashedPassword::new("hash"), LATER)
        .await
        .unwrap();
    assert_eq!(
        Some(HashedPassword::new("hash")),
        odontologos::get_password(&mut ex, odontologo.id).await.unwrap()
    );

    assert_eq!(DbError::NotFound, odontologos::get_password(&mut ex, 555).await.unwrap_err());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologos_get_by_nombre() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;

    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    assert_eq!(
        Some(odontologo),
        odontologos::get_by_nombre(&mut ex, "Dra. Pérez").await.unwrap()
    );
    assert_eq!(None, odontologos::get_by_nombre(&mut ex, "Dr. Nadie").await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_tratamientos_crud() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let mut tratamiento = crear_tratamiento(&mut ex, "Limpieza dental completa").await;
    assert_eq!(
        Some(tratamiento.clone()),
        tratamientos::get_by_descripcion(&mut ex, "Limpieza dental completa").await.unwrap()
    );

    tratamiento.precio = 75.0;
    tratamiento.auditoria.fecha_modificacion = LATER;
    tratamientos::update(&mut ex, &tratamiento).await.unwrap();
    assert_eq!(tratamiento, tratamientos::find_one(&mut ex, tratamiento.id).await.unwrap());

    tratamientos::soft_delete(&mut ex, tratamiento.id, LATER).await.unwrap();
    assert!(tratamientos::find_all(&mut ex).await.unwrap().is_empty());
    assert_eq!(
        None,
        tratamientos::get_by_descripcion(&mut ex, "Limpieza dental completa").await.unwrap()
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_citas_create_requires_existing_references() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let datos = NuevaCita {
        id_paciente: 1,
        id_odontologo: 2,
        id_tratamiento: 3,
        fecha: date!(2025 - 07 - 01),
        hora: time!(10:00),
        estado: "pendiente".to_owned(),
        motivo: None,
    };
    match citas::create(&mut ex, datos, NOW).await {
        Err(DbError::NotFound) => (),
        e => panic!("{:?}", e),
    }

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_citas_exists_activa() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    let tratamiento = crear_tratamiento(&mut ex, "Limpieza dental completa").await;

    let datos = NuevaCita {
        id_paciente: paciente.id,
        id_odontologo: odontologo.id,
        id_tratamiento: tratamiento.id,
        fecha: date!(2025 - 07 - 01),
        hora: time!(10:00),
        estado: "pendiente".to_owned(),
        motivo: Some("Revisión anual".to_owned()),
    };
    let cita = citas::create(&mut ex, datos, NOW).await.unwrap();

    let fecha = date!(2025 - 07 - 01);
    assert!(citas::exists_activa(&mut ex, odontologo.id, fecha, time!(10:00), None).await.unwrap());
    assert!(!citas::exists_activa(&mut ex, odontologo.id, fecha, time!(11:00), None)
        .await
        .unwrap());
    assert!(!citas::exists_activa(&mut ex, odontologo.id + 1, fecha, time!(10:00), None)
        .await
        .unwrap());

    // Excluding the appointment itself lets an update keep its own slot.
    assert!(!citas::exists_activa(&mut ex, odontologo.id, fecha, time!(10:00), Some(cita.id))
        .await
        .unwrap());

    // Soft-deleted appointments do not occupy the slot.
    citas::soft_delete(&mut ex, cita.id, LATER).await.unwrap();
    assert!(!citas::exists_activa(&mut ex, odontologo.id, fecha, time!(10:00), None)
        .await
        .unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_citas_update_and_find() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let paciente = crear_paciente(&mut ex, "ana@example.com", rol.id).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    let tratamiento = crear_tratamiento(&mut ex, "Limpieza dental completa").await;

    let datos = NuevaCita {
        id_paciente: paciente.id,
        id_odontologo: odontologo.id,
        id_tratamiento: tratamiento.id,
        fecha: date!(2025 - 07 - 01),
        hora: time!(10:00),
        estado: "pendiente".to_owned(),
        motivo: None,
    };
    let mut cita = citas::create(&mut ex, datos, NOW).await.unwrap();

    cita.estado = "confirmada".to_owned();
    cita.hora = time!(11:30);
    cita.auditoria.fecha_modificacion = LATER;
    citas::update(&mut ex, &cita).await.unwrap();

    assert_eq!(cita, citas::find_one(&mut ex, cita.id).await.unwrap());
    assert_eq!(vec![cita], citas::find_all(&mut ex).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologo_servicios_pair_lifecycle() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    let tratamiento = crear_tratamiento(&mut ex, "Limpieza dental completa").await;

    assert_eq!(
        None,
        odontologo_servicios::get_by_pair(&mut ex, odontologo.id, tratamiento.id).await.unwrap()
    );

    let servicio =
        odontologo_servicios::create(&mut ex, odontologo.id, tratamiento.id, NOW).await.unwrap();
    assert_eq!(
        Some(servicio),
        odontologo_servicios::get_by_pair(&mut ex, odontologo.id, tratamiento.id).await.unwrap()
    );

    odontologo_servicios::hard_delete_pair(&mut ex, odontologo.id, tratamiento.id).await.unwrap();
    assert_eq!(
        None,
        odontologo_servicios::get_by_pair(&mut ex, odontologo.id, tratamiento.id).await.unwrap()
    );
    assert_eq!(
        DbError::NotFound,
        odontologo_servicios::hard_delete_pair(&mut ex, odontologo.id, tratamiento.id)
            .await
            .unwrap_err()
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologo_servicios_detalle_join() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    let tratamiento = crear_tratamiento(&mut ex, "Limpieza dental completa").await;

    let servicio =
        odontologo_servicios::create(&mut ex, odontologo.id, tratamiento.id, NOW).await.unwrap();

    let detalle = odontologo_servicios::find_all_detalle(&mut ex).await.unwrap();
    assert_eq!(
        vec![OdontologoServicioDetalle {
            id: servicio.id,
            odontologo_id: odontologo.id,
            odontologo_nombre: "Dra. Pérez".to_owned(),
            especialidad: "Ortodoncia".to_owned(),
            tratamiento_id: tratamiento.id,
            tratamiento_nombre: "Limpieza".to_owned(),
            descripcion: "Limpieza dental completa".to_owned(),
            precio: 50.0,
            duracion: 30,
        }],
        detalle
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_odontologo_servicios_disponibles() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;
    let limpieza = crear_tratamiento(&mut ex, "Limpieza dental completa").await;
    let blanqueo = crear_tratamiento(&mut ex, "Blanqueamiento").await;

    odontologo_servicios::create(&mut ex, odontologo.id, limpieza.id, NOW).await.unwrap();

    let asignados =
        odontologo_servicios::find_tratamientos_por_odontologo(&mut ex, odontologo.id)
            .await
            .unwrap();
    assert_eq!(1, asignados.len());
    assert_eq!(limpieza.id, asignados[0].id);

    let disponibles =
        odontologo_servicios::find_tratamientos_disponibles(&mut ex, odontologo.id).await.unwrap();
    assert_eq!(vec![blanqueo], disponibles);

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_horarios_find_by_odontologo_sorted() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();
    let rol = crear_rol(&mut ex).await;
    let odontologo = crear_odontologo(&mut ex, "Dra. Pérez", rol.id).await;

    let tarde = NuevoHorario {
        odontologo_id: odontologo.id,
        dia_semana: 1,
        hora_inicio: time!(14:00),
        hora_fin: time!(18:00),
    };
    let tarde = horarios::create(&mut ex, tarde, NOW).await.unwrap();
    let manana = NuevoHorario {
        odontologo_id: odontologo.id,
        dia_semana: 1,
        hora_inicio: time!(09:00),
        hora_fin: time!(13:00),
    };
    let manana = horarios::create(&mut ex, manana, NOW).await.unwrap();

    assert_eq!(
        vec![manana.clone(), tarde.clone()],
        horarios::find_by_odontologo(&mut ex, odontologo.id).await.unwrap()
    );

    horarios::soft_delete(&mut ex, manana.id, LATER).await.unwrap();
    assert_eq!(vec![tarde], horarios::find_by_odontologo(&mut ex, odontologo.id).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_configuracion_keyed_by_clave() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let mut config = configuracion::create(
        &mut ex,
        "horario_apertura".to_owned(),
        "09:00".to_owned(),
        Some("Hora a la que abre la clínica".to_owned()),
        NOW,
    )
    .await
    .unwrap();

    assert_eq!(config, configuracion::find_one(&mut ex, "horario_apertura").await.unwrap());

    match configuracion::create(&mut ex, "horario_apertura".to_owned(), "10:00".to_owned(), None, NOW)
        .await
    {
        Err(DbError::AlreadyExists) => (),
        e => panic!("{:?}", e),
    }

    config.valor = "08:30".to_owned();
    config.auditoria.fecha_modificacion = LATER;
    configuracion::update(&mut ex, &config).await.unwrap();
    assert_eq!(config, configuracion::find_one(&mut ex, "horario_apertura").await.unwrap());

    configuracion::soft_delete(&mut ex, "horario_apertura", LATER).await.unwrap();
    assert_eq!(
        DbError::NotFound,
        configuracion::find_one(&mut ex, "horario_apertura").await.unwrap_err()
    );
    assert!(configuracion::find_all(&mut ex).await.unwrap().is_empty());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_roles_crud() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let mut rol = roles::create(&mut ex, "odontologo".to_owned(), NOW).await.unwrap();
    assert_eq!(Some(rol.clone()), roles::get_by_nombre(&mut ex, "odontologo").await.unwrap());

    rol.nombre = "administrador".to_owned();
    rol.auditoria.fecha_modificacion = LATER;
    roles::update(&mut ex, &rol).await.unwrap();
    assert_eq!(rol, roles::find_one(&mut ex, rol.id).await.unwrap());

    roles::soft_delete(&mut ex, rol.id, LATER).await.unwrap();
    assert!(roles::find_all(&mut ex).await.unwrap().is_empty());

    drop(ex);
    db.close().await;
}
