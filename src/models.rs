use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub is_staff: bool,
    pub exp: usize,
    pub jti: String,
}

/// Attendance form as posted by the browser. Everything arrives as text so
/// malformed values become a flash message instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct CheckInForm {
    pub empleado: Option<String>,
    pub tipo_evento: Option<String>,
    pub descripcion: Option<String>,
    pub fingerprint: Option<String>,
}
