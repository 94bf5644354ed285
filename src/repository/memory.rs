//! In-memory store used by unit and handler tests.

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use strum::IntoEnumIterator;

use super::{AttendanceRepository, RepoResult, StaffRepository};
use crate::model::{
    attendance_record::{AttendanceRecord, AttendanceRow, NewAttendanceRecord},
    attendance_type::{AttendanceType, PunchKind},
    device_binding::DeviceBinding,
    employee::Employee,
    staff_user::StaffUser,
};

#[derive(Default)]
pub struct MemoryStore {
    pub employees: Vec<Employee>,
    pub types: Vec<AttendanceType>,
    pub records: Mutex<Vec<AttendanceRecord>>,
    pub bindings: Mutex<Vec<DeviceBinding>>,
    pub staff: Vec<StaffUser>,
    /// Makes every call fail, to exercise storage error paths.
    pub broken: bool,
}

impl MemoryStore {
    /// Two employees and the full type vocabulary (ids 1..=8 in enum order).
    pub fn seeded() -> Self {
        let types = PunchKind::iter()
            .enumerate()
            .map(|(i, kind)| AttendanceType {
                id: i as u64 + 1,
                label: kind.label().to_string(),
            })
            .collect();

        Self {
            employees: vec![
                employee(1, "Claudia", "Aguilar"),
                employee(2, "Romulo", "Prieto"),
            ],
            types,
            ..Default::default()
        }
    }

    pub fn type_id(&self, kind: PunchKind) -> u64 {
        self.types
            .iter()
            .find(|t| t.kind() == Some(kind))
            .map(|t| t.id)
            .unwrap()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn push_record(
        &self,
        employee_id: u64,
        kind: PunchKind,
        at: NaiveDateTime,
        fingerprint: Option<&str>,
    ) {
        let mut records = self.records.lock().unwrap();
        let id = records.len() as u64 + 1;
        records.push(AttendanceRecord {
            id,
            employee_id,
            type_id: self.type_id(kind),
            date: at.date(),
            time: at.time(),
            note: None,
            fingerprint: fingerprint.map(str::to_string),
        });
    }

    fn check(&self) -> RepoResult<()> {
        if self.broken {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }

    fn rows(&self) -> Vec<AttendanceRow> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                let employee = self.employees.iter().find(|e| e.id == r.employee_id).unwrap();
                let kind = self.types.iter().find(|t| t.id == r.type_id).unwrap();
                AttendanceRow {
                    id: r.id,
                    employee_id: r.employee_id,
                    first_names: employee.first_names.clone(),
                    last_names: employee.last_names.clone(),
                    type_label: kind.label.clone(),
                    date: r.date,
                    time: r.time,
                    note: r.note.clone(),
                    fingerprint: r.fingerprint.clone(),
                }
            })
            .collect()
    }
}

pub fn employee(id: u64, first_names: &str, last_names: &str) -> Employee {
    Employee {
        id,
        first_names: first_names.to_string(),
        last_names: last_names.to_string(),
        national_id: format!("{:08}", 10_000_000 + id),
        contract: "Planilla".to_string(),
    }
}

impl AttendanceRepository for MemoryStore {
    async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        self.check()?;
        Ok(self.employees.clone())
    }

    async fn find_employee(&self, id: u64) -> RepoResult<Option<Employee>> {
        self.check()?;
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn list_attendance_types(&self) -> RepoResult<Vec<AttendanceType>> {
        self.check()?;
        Ok(self.types.clone())
    }

    async fn find_attendance_type(&self, id: u64) -> RepoResult<Option<AttendanceType>> {
        self.check()?;
        Ok(self.types.iter().find(|t| t.id == id).cloned())
    }

    async fn punch_exists(
        &self,
        employee_id: u64,
        type_id: u64,
        date: NaiveDate,
    ) -> RepoResult<bool> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.employee_id == employee_id && r.type_id == type_id && r.date == date))
    }

    async fn fingerprint_used_by_other(
        &self,
        fingerprint: &str,
        employee_id: u64,
        date: NaiveDate,
    ) -> RepoResult<bool> {
        self.check()?;
        Ok(self.records.lock().unwrap().iter().any(|r| {
            r.fingerprint.as_deref() == Some(fingerprint)
                && r.date == date
                && r.employee_id != employee_id
        }))
    }

    async fn insert_record(&self, record: NewAttendanceRecord) -> RepoResult<AttendanceRecord> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let stored = record.into_record(records.len() as u64 + 1);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_records_newest_first(&self) -> RepoResult<Vec<AttendanceRow>> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| (b.date, b.time, b.id).cmp(&(a.date, a.time, a.id)));
        Ok(rows)
    }

    async fn list_records_by_employee_day(&self) -> RepoResult<Vec<AttendanceRow>> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by_key(|r| (r.employee_id, r.date, r.time, r.id));
        Ok(rows)
    }

    async fn find_binding(&self, fingerprint: &str) -> RepoResult<Option<DeviceBinding>> {
        self.check()?;
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.fingerprint == fingerprint)
            .cloned())
    }

    async fn upsert_binding(&self, fingerprint: &str, employee_id: u64) -> RepoResult<()> {
        self.check()?;
        let now = chrono::Utc::now().naive_utc();
        let mut bindings = self.bindings.lock().unwrap();
        match bindings.iter_mut().find(|b| b.fingerprint == fingerprint) {
            Some(existing) => {
                existing.employee_id = employee_id;
                existing.updated_at = now;
            }
            None => bindings.push(DeviceBinding {
                fingerprint: fingerprint.to_string(),
                employee_id,
                updated_at: now,
            }),
        }
        Ok(())
    }
}

impl StaffRepository for MemoryStore {
    async fn find_staff_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>> {
        self.check()?;
        Ok(self.staff.iter().find(|s| s.username == username).cloned())
    }

    async fn touch_last_login(&self, _staff_id: u64) -> RepoResult<()> {
        self.check()
    }
}
