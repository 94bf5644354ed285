use chrono::{NaiveDateTime, Timelike};
use derive_more::Display;
use tracing::{error, info, warn};

use crate::model::{
    attendance_record::{AttendanceRecord, NewAttendanceRecord},
    attendance_type::AttendanceType,
    employee::Employee,
};
use crate::repository::AttendanceRepository;

pub const MAX_NOTE_CHARS: usize = 50;
pub const MAX_FINGERPRINT_CHARS: usize = 100;

/// A check-in attempt, as parsed from a form.
#[derive(Debug, Default, Clone)]
pub struct CheckInRequest {
    pub employee_id: Option<u64>,
    pub type_id: Option<u64>,
    pub note: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub record: AttendanceRecord,
    pub employee: Employee,
    pub attendance_type: AttendanceType,
}

impl Registered {
    pub fn message(&self) -> String {
        format!("{} registrada correctamente.", self.attendance_type.label)
    }
}

/// Why a check-in was refused. `Display` is the message shown to the user.
#[derive(Debug, Display)]
pub enum CheckInError {
    #[display(fmt = "Error: Empleado o tipo de asistencia no encontrado.")]
    NotFound,
    #[display(fmt = "Ya registraste \"{}\" hoy.", label)]
    DuplicatePunch { label: String },
    #[display(
        fmt = "Este dispositivo ya ha sido usado para registrar la asistencia de otro empleado hoy."
    )]
    FingerprintInUse,
    #[display(fmt = "El identificador del dispositivo no es válido.")]
    InvalidFingerprint,
    #[display(fmt = "Error inesperado. Intente nuevamente.")]
    Storage(sqlx::Error),
}

impl std::error::Error for CheckInError {}

impl CheckInError {
    /// Duplicate punches are a warning; the employee already did what they meant to.
    pub fn is_warning(&self) -> bool {
        matches!(self, CheckInError::DuplicatePunch { .. })
    }
}

impl From<sqlx::Error> for CheckInError {
    fn from(e: sqlx::Error) -> Self {
        CheckInError::Storage(e)
    }
}

/// Parses a numeric form field. Blank or malformed input is `None`.
pub fn parse_id(raw: Option<&str>) -> Option<u64> {
    raw.map(str::trim).filter(|s| !s.is_empty())?.parse().ok()
}

/// Trims a free-text note, drops it when blank and caps its length.
pub fn normalize_note(raw: Option<&str>) -> Option<String> {
    let note = raw.map(str::trim).filter(|s| !s.is_empty())?;
    Some(note.chars().take(MAX_NOTE_CHARS).collect())
}

/// Trims a device fingerprint. Blank is `Ok(None)`, oversized is an error.
pub fn normalize_fingerprint(raw: Option<&str>) -> Result<Option<String>, CheckInError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(fp) if fp.chars().count() > MAX_FINGERPRINT_CHARS => {
            Err(CheckInError::InvalidFingerprint)
        }
        Some(fp) => Ok(Some(fp.to_string())),
    }
}

/// Validates and stores one punch at `now` (local time).
pub async fn register_punch<R>(
    repo: &R,
    request: CheckInRequest,
    now: NaiveDateTime,
) -> Result<Registered, CheckInError>
where
    R: AttendanceRepository,
{
    let (Some(employee_id), Some(type_id)) = (request.employee_id, request.type_id) else {
        return Err(CheckInError::NotFound);
    };

    let employee = repo
        .find_employee(employee_id)
        .await
        .map_err(log_storage)?
        .ok_or(CheckInError::NotFound)?;
    let attendance_type = repo
        .find_attendance_type(type_id)
        .await
        .map_err(log_storage)?
        .ok_or(CheckInError::NotFound)?;

    let note = normalize_note(request.note.as_deref());
    let fingerprint = normalize_fingerprint(request.fingerprint.as_deref())?;

    let date = now.date();
    // whole seconds, matching the TIME column
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

    if attendance_type.is_unique_per_day()
        && repo
            .punch_exists(employee.id, attendance_type.id, date)
            .await
            .map_err(log_storage)?
    {
        warn!(employee_id, label = %attendance_type.label, %date, "Duplicate punch rejected");
        return Err(CheckInError::DuplicatePunch {
            label: attendance_type.label.clone(),
        });
    }

    if let Some(fp) = fingerprint.as_deref() {
        if repo
            .fingerprint_used_by_other(fp, employee.id, date)
            .await
            .map_err(log_storage)?
        {
            warn!(employee_id, fingerprint = fp, %date, "Fingerprint already used by another employee");
            return Err(CheckInError::FingerprintInUse);
        }
    }

    let record = repo
        .insert_record(NewAttendanceRecord {
            employee_id: employee.id,
            type_id: attendance_type.id,
            date,
            time,
            note,
            fingerprint,
        })
        .await
        .map_err(log_storage)?;

    info!(
        record_id = record.id,
        employee_id,
        label = %attendance_type.label,
        %date,
        %time,
        "Punch registered"
    );

    Ok(Registered {
        record,
        employee,
        attendance_type,
    })
}

fn log_storage(e: sqlx::Error) -> CheckInError {
    error!(error = %e, "Check-in storage failure");
    CheckInError::Storage(e)
}
