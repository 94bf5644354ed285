use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::employee::full_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub type_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub note: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub employee_id: u64,
    pub type_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub note: Option<String>,
    pub fingerprint: Option<String>,
}

impl NewAttendanceRecord {
    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: self.employee_id,
            type_id: self.type_id,
            date: self.date,
            time: self.time,
            note: self.note,
            fingerprint: self.fingerprint,
        }
    }
}

/// A record joined with its employee and type, as read for reports.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub first_names: String,
    pub last_names: String,
    pub type_label: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub note: Option<String>,
    pub fingerprint: Option<String>,
}

impl AttendanceRow {
    pub fn employee_name(&self) -> String {
        full_name(&self.first_names, &self.last_names)
    }
}
