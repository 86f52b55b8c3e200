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

//! High-level data types for the clinic's domain.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

/// Errors raised when validating input data.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// A validation failure attributed to a single input field.
///
/// Request validation collects all failures instead of stopping at the first
/// one so that the caller gets a complete picture of what is wrong.
#[derive(Debug, PartialEq)]
pub(crate) struct FieldError {
    /// Name of the offending field as it appears in the request.
    pub(crate) campo: &'static str,

    /// Description of the problem.
    pub(crate) mensaje: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.campo, self.mensaje)
    }
}

/// Serde helper for dates rendered as `YYYY-MM-DD`.
time::serde::format_description!(fecha_iso, Date, "[year]-[month]-[day]");

/// Serde helper for times rendered as `HH:MM`.
time::serde::format_description!(hora_corta, Time, "[hour]:[minute]");

/// Wire format of calendar dates.
const FORMATO_FECHA: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Wire format of times of day.
const FORMATO_HORA: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

/// Parses a `YYYY-MM-DD` date from untrusted input.
pub(crate) fn parse_fecha(s: &str) -> ModelResult<Date> {
    Date::parse(s.trim(), FORMATO_FECHA)
        .map_err(|_| ModelError(format!("'{}' no es una fecha válida (AAAA-MM-DD)", s)))
}

/// Parses an `HH:MM` time of day from untrusted input.
pub(crate) fn parse_hora(s: &str) -> ModelResult<Time> {
    Time::parse(s.trim(), FORMATO_HORA)
        .map_err(|_| ModelError(format!("'{}' no es una hora válida (HH:MM)", s)))
}

/// Validates a mandatory text field: trims it and enforces a maximum length.
pub(crate) fn texto_obligatorio(valor: &str, max: usize) -> ModelResult<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Err(ModelError("es obligatorio".to_owned()));
    }
    if valor.chars().count() > max {
        return Err(ModelError(format!("excede los {} caracteres", max)));
    }
    Ok(valor.to_owned())
}

/// Validates an optional text field.  Empty values collapse to `None`.
pub(crate) fn texto_opcional(valor: &str, max: usize) -> ModelResult<Option<String>> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Ok(None);
    }
    if valor.chars().count() > max {
        return Err(ModelError(format!("excede los {} caracteres", max)));
    }
    Ok(Some(valor.to_owned()))
}

/// Validates a treatment price.
pub(crate) fn precio_valido(precio: f64) -> ModelResult<f64> {
    if !precio.is_finite() || precio < 0.0 {
        return Err(ModelError("debe ser un número no negativo".to_owned()));
    }
    Ok(precio)
}

/// Validates a treatment duration in minutes.
pub(crate) fn duracion_valida(duracion: i32) -> ModelResult<i32> {
    if duracion <= 0 {
        return Err(ModelError("debe ser un número de minutos positivo".to_owned()));
    }
    Ok(duracion)
}

/// Validates a day of the week, with 0 being Sunday and 6 being Saturday.
pub(crate) fn dia_semana_valido(dia: i16) -> ModelResult<i16> {
    if !(0..=6).contains(&dia) {
        return Err(ModelError("debe estar entre 0 (domingo) y 6 (sábado)".to_owned()));
    }
    Ok(dia)
}

/// Maximum length of email addresses per the schema.
pub(crate) const MAX_EMAIL_LENGTH: usize = 100;

/// Represents a correctly-formatted email address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new email address from an untrusted string `s`, making sure it is valid.
    ///
    /// Attempting to fully validate an email address is futile, so this only checks the
    /// basic shape needed to pass the data around correctly.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        let s = s.trim().to_owned();

        if s.is_empty() {
            return Err(ModelError("es obligatorio".to_owned()));
        }
        if s.len() > MAX_EMAIL_LENGTH {
            return Err(ModelError(format!("excede los {} caracteres", MAX_EMAIL_LENGTH)));
        }
        if !s.contains('@') || s.contains(' ') {
            return Err(ModelError(format!("'{}' no parece una dirección válida", s)));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the email address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&str> for EmailAddress {
    fn from(raw: &str) -> Self {
        EmailAddress::new(raw).expect("Hardcoded email addresses for testing must be valid")
    }
}

/// An opaque type to hold a password, protecting it from leaking into logs.
#[derive(Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Creates a new password from a literal string.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(ModelError("es obligatorio".to_owned()));
        }
        if s.len() > 56 {
            return Err(ModelError("excede la longitud máxima de una contraseña".to_owned()));
        }
        Ok(Password(s))
    }

    /// Returns a string view of the password.
    #[cfg(test)]
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Hashes the password after validating that it is sufficiently complex via the `validator`
    /// hook.  Consumes the password because there is no context in which keeping the password
    /// alive once we have generated its hash is correct.
    pub(crate) fn validate_and_hash(
        self,
        validator: fn(&str) -> Option<&'static str>,
    ) -> ModelResult<HashedPassword> {
        if let Some(error) = validator(&self.0) {
            return Err(ModelError(format!("Contraseña débil: {}", error)));
        }
        let hashed = bcrypt::hash(self.0, 10)
            .map_err(|e| ModelError(format!("Error de contraseña: {}", e)))?;
        Ok(HashedPassword::new(hashed))
    }

    /// Verifies if this password matches a given `hash`.
    pub(crate) fn verify(self, hash: &HashedPassword) -> ModelResult<bool> {
        bcrypt::verify(self.0, hash.as_str())
            .map_err(|e| ModelError(format!("Error de contraseña: {}", e)))
    }
}

#[cfg(test)]
impl From<&'static str> for Password {
    fn from(s: &'static str) -> Self {
        Password::new(s).expect("Hardcoded passwords must be valid")
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed password")
    }
}

/// An opaque type to hold a hashed password, protecting it from leaking into logs.
#[derive(Clone, PartialEq)]
pub(crate) struct HashedPassword(String);

impl HashedPassword {
    /// Creates a new hashed password from a literal string.
    pub(crate) fn new<S: Into<String>>(s: S) -> Self {
        HashedPassword(s.into())
    }

    /// Returns a string view of the hash.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed hash")
    }
}

/// Complexity hook for user-chosen passwords.
pub(crate) fn validar_password_nueva(password: &str) -> Option<&'static str> {
    if password.len() < 8 {
        return Some("debe tener al menos 8 caracteres");
    }
    None
}

/// Audit columns carried by every persisted entity.
///
/// A row is soft-deleted when `fecha_eliminacion` is set; such rows are kept
/// for audit history and excluded from the default queries.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Auditoria {
    /// Creation time of the row.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) fecha_creacion: OffsetDateTime,

    /// Last modification time of the row.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) fecha_modificacion: OffsetDateTime,

    /// Soft-deletion time of the row, or none if the row is active.
    #[serde(with = "time::serde::rfc3339::option")]
    pub(crate) fecha_eliminacion: Option<OffsetDateTime>,
}

impl Auditoria {
    /// Creates the audit columns of a row created at `now`.
    pub(crate) fn nueva(now: OffsetDateTime) -> Self {
        Self { fecha_creacion: now, fecha_modificacion: now, fecha_eliminacion: None }
    }
}

/// A patient of the clinic.  The password hash lives in the same table but is
/// intentionally not part of this type so that it can never leak in a response.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Paciente {
    /// Identifier of the patient.
    pub(crate) id: i64,

    /// Full name.
    pub(crate) nombre: String,

    /// Date of birth.
    #[serde(with = "fecha_iso")]
    pub(crate) fecha_nacimiento: Date,

    /// Contact phone number.
    pub(crate) telefono: String,

    /// Contact email address; unique among active patients.
    pub(crate) email: String,

    /// Role assigned to the patient for client-side route gating.
    pub(crate) rol_id: i64,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// Validated data to create a patient.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct NuevoPaciente {
    /// Full name.
    pub(crate) nombre: String,

    /// Date of birth.
    pub(crate) fecha_nacimiento: Date,

    /// Contact phone number.
    pub(crate) telefono: String,

    /// Contact email address.
    pub(crate) email: EmailAddress,

    /// Role to assign.
    pub(crate) rol_id: i64,
}

/// Validated partial update of a patient.
#[derive(Debug, Default)]
pub(crate) struct ActualizacionPaciente {
    /// New full name, if any.
    pub(crate) nombre: Option<String>,

    /// New date of birth, if any.
    pub(crate) fecha_nacimiento: Option<Date>,

    /// New phone number, if any.
    pub(crate) telefono: Option<String>,

    /// New email address, if any.
    pub(crate) email: Option<EmailAddress>,

    /// New role, if any.
    pub(crate) rol_id: Option<i64>,
}

/// A dentist of the clinic.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Odontologo {
    /// Identifier of the dentist.
    pub(crate) id: i64,

    /// Full name; unique among active dentists.
    pub(crate) nombre: String,

    /// Specialty of the dentist.
    pub(crate) especialidad: String,

    /// Contact phone number.
    pub(crate) telefono: String,

    /// Role assigned to the dentist.
    pub(crate) rol_id: i64,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// Validated data to create a dentist.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct NuevoOdontologo {
    /// Full name.
    pub(crate) nombre: String,

    /// Specialty.
    pub(crate) especialidad: String,

    /// Contact phone number.
    pub(crate) telefono: String,

    /// Role to assign.
    pub(crate) rol_id: i64,
}

/// Validated partial update of a dentist.
#[derive(Debug, Default)]
pub(crate) struct ActualizacionOdontologo {
    /// New full name, if any.
    pub(crate) nombre: Option<String>,

    /// New specialty, if any.
    pub(crate) especialidad: Option<String>,

    /// New phone number, if any.
    pub(crate) telefono: Option<String>,

    /// New role, if any.
    pub(crate) rol_id: Option<i64>,
}

/// A treatment offered by the clinic.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Tratamiento {
    /// Identifier of the treatment.
    pub(crate) id: i64,

    /// Short name of the treatment.
    pub(crate) nombre: String,

    /// Description; uniqueness is checked at creation time.
    pub(crate) descripcion: String,

    /// Price of the treatment.
    pub(crate) precio: f64,

    /// Duration of the treatment in minutes.
    pub(crate) duracion: i32,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// Validated data to create a treatment.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct NuevoTratamiento {
    /// Short name of the treatment.
    pub(crate) nombre: String,

    /// Description.
    pub(crate) descripcion: String,

    /// Price.
    pub(crate) precio: f64,

    /// Duration in minutes.
    pub(crate) duracion: i32,
}

/// Validated partial update of a treatment.
#[derive(Debug, Default)]
pub(crate) struct ActualizacionTratamiento {
    /// New name, if any.
    pub(crate) nombre: Option<String>,

    /// New description, if any.
    pub(crate) descripcion: Option<String>,

    /// New price, if any.
    pub(crate) precio: Option<f64>,

    /// New duration, if any.
    pub(crate) duracion: Option<i32>,
}

/// An appointment linking a patient, a dentist and a treatment at a date and
/// time, with a free-form status string.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Cita {
    /// Identifier of the appointment.
    pub(crate) id: i64,

    /// Patient attending the appointment.
    pub(crate) id_paciente: i64,

    /// Dentist serving the appointment.
    pub(crate) id_odontologo: i64,

    /// Treatment to perform.
    pub(crate) id_tratamiento: i64,

    /// Scheduled date.
    #[serde(with = "fecha_iso")]
    pub(crate) fecha: Date,

    /// Scheduled time of day.
    #[serde(with = "hora_corta")]
    pub(crate) hora: Time,

    /// Status of the appointment (e.g. "pendiente", "confirmada", "cancelada").
    pub(crate) estado: String,

    /// Optional reason for the visit.
    pub(crate) motivo: Option<String>,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// Validated data to create an appointment.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct NuevaCita {
    /// Patient attending the appointment.
    pub(crate) id_paciente: i64,

    /// Dentist serving the appointment.
    pub(crate) id_odontologo: i64,

    /// Treatment to perform.
    pub(crate) id_tratamiento: i64,

    /// Scheduled date.
    pub(crate) fecha: Date,

    /// Scheduled time of day.
    pub(crate) hora: Time,

    /// Status of the appointment.
    pub(crate) estado: String,

    /// Optional reason for the visit.
    pub(crate) motivo: Option<String>,
}

/// Validated partial update of an appointment.
#[derive(Debug, Default)]
pub(crate) struct ActualizacionCita {
    /// New patient, if any.
    pub(crate) id_paciente: Option<i64>,

    /// New dentist, if any.
    pub(crate) id_odontologo: Option<i64>,

    /// New treatment, if any.
    pub(crate) id_tratamiento: Option<i64>,

    /// New date, if any.
    pub(crate) fecha: Option<Date>,

    /// New time of day, if any.
    pub(crate) hora: Option<Time>,

    /// New status, if any.
    pub(crate) estado: Option<String>,

    /// New reason, if any.
    pub(crate) motivo: Option<String>,
}

/// Association that grants a dentist the ability to perform a treatment.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct OdontologoServicio {
    /// Identifier of the association.
    pub(crate) id: i64,

    /// Associated dentist.
    pub(crate) odontologo_id: i64,

    /// Associated treatment.
    pub(crate) tratamiento_id: i64,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// An association joined with the dentist and treatment it references.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct OdontologoServicioDetalle {
    /// Identifier of the association.
    pub(crate) id: i64,

    /// Associated dentist.
    pub(crate) odontologo_id: i64,

    /// Name of the associated dentist.
    pub(crate) odontologo_nombre: String,

    /// Specialty of the associated dentist.
    pub(crate) especialidad: String,

    /// Associated treatment.
    pub(crate) tratamiento_id: i64,

    /// Name of the associated treatment.
    pub(crate) tratamiento_nombre: String,

    /// Description of the associated treatment.
    pub(crate) descripcion: String,

    /// Price of the associated treatment.
    pub(crate) precio: f64,

    /// Duration in minutes of the associated treatment.
    pub(crate) duracion: i32,
}

/// Flattened summary of a treatment associated with a dentist.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct TratamientoResumen {
    /// Identifier of the treatment.
    pub(crate) id: i64,

    /// Short name of the treatment.
    pub(crate) nombre: String,

    /// Description of the treatment.
    pub(crate) descripcion: String,

    /// Price of the treatment.
    pub(crate) precio: f64,

    /// Duration of the treatment in minutes.
    pub(crate) duracion: i32,
}

/// An authorization role gating client-side route access.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Rol {
    /// Identifier of the role.
    pub(crate) id: i64,

    /// Name of the role (e.g. "paciente", "odontologo").
    pub(crate) nombre: String,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// A weekly attendance slot of a dentist.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Horario {
    /// Identifier of the schedule entry.
    pub(crate) id: i64,

    /// Dentist the schedule belongs to.
    pub(crate) odontologo_id: i64,

    /// Day of the week, with 0 being Sunday and 6 being Saturday.
    pub(crate) dia_semana: i16,

    /// Start of the attendance slot.
    #[serde(with = "hora_corta")]
    pub(crate) hora_inicio: Time,

    /// End of the attendance slot.
    #[serde(with = "hora_corta")]
    pub(crate) hora_fin: Time,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}

/// Validated data to create a schedule entry.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct NuevoHorario {
    /// Dentist the schedule belongs to.
    pub(crate) odontologo_id: i64,

    /// Day of the week.
    pub(crate) dia_semana: i16,

    /// Start of the attendance slot.
    pub(crate) hora_inicio: Time,

    /// End of the attendance slot.
    pub(crate) hora_fin: Time,
}

/// Validated partial update of a schedule entry.
#[derive(Debug, Default)]
pub(crate) struct ActualizacionHorario {
    /// New day of the week, if any.
    pub(crate) dia_semana: Option<i16>,

    /// New start of the slot, if any.
    pub(crate) hora_inicio: Option<Time>,

    /// New end of the slot, if any.
    pub(crate) hora_fin: Option<Time>,
}

/// A key/value configuration setting.
#[derive(Clone, Debug, FromRow, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Configuracion {
    /// Key of the setting; primary key of the table.
    pub(crate) clave: String,

    /// Value of the setting.
    pub(crate) valor: String,

    /// Optional human-readable description of the setting.
    pub(crate) descripcion: Option<String>,

    /// Audit columns.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub(crate) auditoria: Auditoria,
}
