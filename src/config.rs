use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub session_ttl: usize,

    /// Offset used to decide what "today" is for a punch.
    pub utc_offset: FixedOffset,

    pub app_url: String,
    pub entry_path: String,
    pub api_prefix: String,
    pub log_dir: String,
    pub run_migrations: bool,
    pub secure_cookies: bool,

    // Rate limiting
    pub rate_checkin_per_min: u32,
    pub rate_login_per_min: u32,
    pub rate_api_per_min: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let offset_minutes: i32 = parse_var(&lookup, "UTC_OFFSET_MINUTES", "-300")?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("UTC_OFFSET_MINUTES out of range: {offset_minutes}"))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            session_ttl: parse_var(&lookup, "SESSION_TTL", "28800")?, // default 8 hours
            utc_offset,

            app_url: or_default("APP_URL", "http://127.0.0.1:8000/"),
            entry_path: or_default("APP_ENTRY_PATH", "/qr/checkin"),
            api_prefix: or_default("API_PREFIX", "/api"),
            log_dir: or_default("LOG_DIR", "logs"),
            run_migrations: parse_var(&lookup, "RUN_MIGRATIONS", "true")?,
            secure_cookies: parse_var(&lookup, "SECURE_COOKIES", "false")?,

            rate_checkin_per_min: parse_var(&lookup, "RATE_CHECKIN_PER_MIN", "30")?,
            rate_login_per_min: parse_var(&lookup, "RATE_LOGIN_PER_MIN", "20")?,
            rate_api_per_min: parse_var(&lookup, "RATE_API_PER_MIN", "120")?,
        })
    }

    /// Current wall-clock time in the configured offset.
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }

    /// URL encoded into the kiosk QR code.
    pub fn kiosk_url(&self) -> String {
        kiosk_url(&self.app_url, &self.entry_path)
    }
}

pub fn kiosk_url(base: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("invalid value for {key}"))
}
