use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffUser {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
}

impl StaffUser {
    pub fn can_download_reports(&self) -> bool {
        self.is_staff && self.is_active
    }
}
