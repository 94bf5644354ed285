use chrono::NaiveDate;
use sqlx::MySqlPool;
use strum::IntoEnumIterator;
use tracing::debug;

use super::{AttendanceRepository, RepoResult, StaffRepository};
use crate::model::{
    attendance_record::{AttendanceRecord, AttendanceRow, NewAttendanceRecord},
    attendance_type::{AttendanceType, PunchKind},
    device_binding::DeviceBinding,
    employee::{Employee, NewEmployee},
    staff_user::StaffUser,
};

const ROW_SELECT: &str = r#"
    SELECT
        r.id,
        r.employee_id,
        e.first_names,
        e.last_names,
        t.label AS type_label,
        r.date,
        r.time,
        r.note,
        r.fingerprint
    FROM attendance_records r
    JOIN employees e ON e.id = r.employee_id
    JOIN attendance_types t ON t.id = r.type_id
"#;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Inserts any missing attendance types. Returns how many were added.
    pub async fn seed_attendance_types(&self) -> RepoResult<u64> {
        let mut added = 0;
        for kind in PunchKind::iter() {
            let result = sqlx::query("INSERT IGNORE INTO attendance_types (label) VALUES (?)")
                .bind(kind.label())
                .execute(&self.pool)
                .await?;
            added += result.rows_affected();
        }
        Ok(added)
    }

    /// Returns false when the national id already exists.
    pub async fn insert_employee(&self, employee: &NewEmployee) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO employees (first_names, last_names, national_id, contract)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(employee.first_names.trim())
        .bind(employee.last_names.trim())
        .bind(employee.national_id.trim())
        .bind(employee.contract.trim())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Returns false when no such user exists.
    pub async fn set_staff_password(&self, username: &str, password_hash: &str) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE staff_users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn create_staff_user(&self, username: &str, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO staff_users (username, password_hash, is_staff, is_active)
            VALUES (?, ?, TRUE, TRUE)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl AttendanceRepository for MySqlStore {
    async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_names, last_names, national_id, contract
            FROM employees
            ORDER BY first_names, last_names
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn find_employee(&self, id: u64) -> RepoResult<Option<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_names, last_names, national_id, contract
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_attendance_types(&self) -> RepoResult<Vec<AttendanceType>> {
        sqlx::query_as::<_, AttendanceType>("SELECT id, label FROM attendance_types ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_attendance_type(&self, id: u64) -> RepoResult<Option<AttendanceType>> {
        sqlx::query_as::<_, AttendanceType>("SELECT id, label FROM attendance_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn punch_exists(
        &self,
        employee_id: u64,
        type_id: u64,
        date: NaiveDate,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE employee_id = ? AND type_id = ? AND date = ?
                LIMIT 1
            )
            "#,
        )
        .bind(employee_id)
        .bind(type_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
    }

    async fn fingerprint_used_by_other(
        &self,
        fingerprint: &str,
        employee_id: u64,
        date: NaiveDate,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE fingerprint = ? AND date = ? AND employee_id <> ?
                LIMIT 1
            )
            "#,
        )
        .bind(fingerprint)
        .bind(date)
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_record(&self, record: NewAttendanceRecord) -> RepoResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (employee_id, type_id, date, time, note, fingerprint)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.type_id)
        .bind(record.date)
        .bind(record.time)
        .bind(record.note.as_deref())
        .bind(record.fingerprint.as_deref())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        debug!(record_id = id, employee_id = record.employee_id, "Attendance record stored");
        Ok(record.into_record(id))
    }

    async fn list_records_newest_first(&self) -> RepoResult<Vec<AttendanceRow>> {
        let sql = format!("{ROW_SELECT} ORDER BY r.date DESC, r.time DESC, r.id DESC");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn list_records_by_employee_day(&self) -> RepoResult<Vec<AttendanceRow>> {
        let sql = format!("{ROW_SELECT} ORDER BY r.employee_id, r.date, r.time, r.id");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_binding(&self, fingerprint: &str) -> RepoResult<Option<DeviceBinding>> {
        sqlx::query_as::<_, DeviceBinding>(
            r#"
            SELECT fingerprint, employee_id, updated_at
            FROM device_bindings
            WHERE fingerprint = ?
            "#,
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
    }

    async fn upsert_binding(&self, fingerprint: &str, employee_id: u64) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_bindings (fingerprint, employee_id, updated_at)
            VALUES (?, ?, NOW())
            ON DUPLICATE KEY UPDATE employee_id = VALUES(employee_id), updated_at = NOW()
            "#,
        )
        .bind(fingerprint)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl StaffRepository for MySqlStore {
    async fn find_staff_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>> {
        sqlx::query_as::<_, StaffUser>(
            r#"
            SELECT id, username, password_hash, is_staff, is_active, last_login_at
            FROM staff_users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn touch_last_login(&self, staff_id: u64) -> RepoResult<()> {
        sqlx::query("UPDATE staff_users SET last_login_at = NOW() WHERE id = ?")
            .bind(staff_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
