use derive_more::Display;
use tracing::{debug, error, info};

use crate::model::employee::Employee;
use crate::repository::AttendanceRepository;
use crate::service::attendance::MAX_FINGERPRINT_CHARS;
use crate::utils::fingerprint_cache::FingerprintCache;

#[derive(Debug, Display)]
pub enum BindError {
    #[display(fmt = "Identificador de dispositivo inválido")]
    InvalidFingerprint,
    #[display(fmt = "Empleado no encontrado")]
    UnknownEmployee,
    #[display(fmt = "Error inesperado")]
    Storage(sqlx::Error),
}

impl std::error::Error for BindError {}

impl From<sqlx::Error> for BindError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "Fingerprint storage failure");
        BindError::Storage(e)
    }
}

fn clean(fingerprint: &str) -> Option<&str> {
    let fp = fingerprint.trim();
    (!fp.is_empty() && fp.chars().count() <= MAX_FINGERPRINT_CHARS).then_some(fp)
}

/// The employee this device was last bound to, if any.
pub async fn identify<R>(
    repo: &R,
    cache: &FingerprintCache,
    fingerprint: &str,
) -> Result<Option<Employee>, sqlx::Error>
where
    R: AttendanceRepository,
{
    let Some(fp) = clean(fingerprint) else {
        return Ok(None);
    };

    let employee_id = match cache.get(fp).await {
        Some(id) => {
            debug!(fingerprint = fp, employee_id = id, "Fingerprint cache hit");
            id
        }
        None => match repo.find_binding(fp).await? {
            Some(binding) => {
                cache.remember(fp, binding.employee_id).await;
                binding.employee_id
            }
            None => return Ok(None),
        },
    };

    let employee = repo.find_employee(employee_id).await?;
    if employee.is_none() {
        cache.forget(fp).await;
    }
    Ok(employee)
}

/// Binds a device to an employee. The latest binding wins.
pub async fn bind<R>(
    repo: &R,
    cache: &FingerprintCache,
    fingerprint: &str,
    employee_id: u64,
) -> Result<Employee, BindError>
where
    R: AttendanceRepository,
{
    let fp = clean(fingerprint).ok_or(BindError::InvalidFingerprint)?;
    let employee = repo
        .find_employee(employee_id)
        .await?
        .ok_or(BindError::UnknownEmployee)?;

    repo.upsert_binding(fp, employee.id).await?;
    cache.remember(fp, employee.id).await;

    info!(fingerprint = fp, employee_id = employee.id, "Device bound to employee");
    Ok(employee)
}
