use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Remembers which employee last checked in from a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceBinding {
    pub fingerprint: String,
    pub employee_id: u64,
    pub updated_at: NaiveDateTime,
}
