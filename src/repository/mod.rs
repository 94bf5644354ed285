#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use crate::model::{
    attendance_record::{AttendanceRecord, AttendanceRow, NewAttendanceRecord},
    attendance_type::AttendanceType,
    device_binding::DeviceBinding,
    employee::Employee,
    staff_user::StaffUser,
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Storage for employees, punches and device bindings.
pub trait AttendanceRepository {
    /// Employees ordered by name, for the form's select box.
    async fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    async fn find_employee(&self, id: u64) -> RepoResult<Option<Employee>>;

    async fn list_attendance_types(&self) -> RepoResult<Vec<AttendanceType>>;
    async fn find_attendance_type(&self, id: u64) -> RepoResult<Option<AttendanceType>>;

    /// Whether `employee_id` already has a punch of `type_id` on `date`.
    async fn punch_exists(&self, employee_id: u64, type_id: u64, date: NaiveDate)
    -> RepoResult<bool>;

    /// Whether some employee other than `employee_id` punched with
    /// `fingerprint` on `date`.
    async fn fingerprint_used_by_other(
        &self,
        fingerprint: &str,
        employee_id: u64,
        date: NaiveDate,
    ) -> RepoResult<bool>;

    async fn insert_record(&self, record: NewAttendanceRecord) -> RepoResult<AttendanceRecord>;

    /// All punches, newest first (date desc, time desc).
    async fn list_records_newest_first(&self) -> RepoResult<Vec<AttendanceRow>>;

    /// All punches ordered by employee, date and time.
    async fn list_records_by_employee_day(&self) -> RepoResult<Vec<AttendanceRow>>;

    async fn find_binding(&self, fingerprint: &str) -> RepoResult<Option<DeviceBinding>>;
    async fn upsert_binding(&self, fingerprint: &str, employee_id: u64) -> RepoResult<()>;
}

pub trait StaffRepository {
    async fn find_staff_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>>;
    async fn touch_last_login(&self, staff_id: u64) -> RepoResult<()>;
}
