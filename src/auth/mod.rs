pub mod auth;
pub mod jwt;
pub mod middleware;
pub mod password;

pub const SESSION_COOKIE: &str = "staff_session";
pub const LOGIN_PATH: &str = "/accounts/login";
