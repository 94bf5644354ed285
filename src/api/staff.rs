use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::generate_session_token;
use crate::auth::password::verify_password;
use crate::auth::{LOGIN_PATH, SESSION_COOKIE};
use crate::config::Config;
use crate::error::AppError;
use crate::models::LoginForm;
use crate::repository::StaffRepository;
use crate::views;

pub const DOWNLOAD_PATH: &str = "/login/descarga";

const BAD_CREDENTIALS: &str = "Usuario o contraseña incorrectos.";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Only same-site relative paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DOWNLOAD_PATH,
    }
}

fn login_page(error: Option<&str>, next: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(views::login_page(error, next))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// GET /accounts/login
pub async fn show_login(query: web::Query<LoginQuery>) -> HttpResponse {
    login_page(None, safe_next(query.next.as_deref()))
}

/// POST /accounts/login
#[instrument(
    name = "staff_login",
    skip(repo, config, form),
    fields(username = %form.username)
)]
pub async fn login<R>(
    repo: web::Data<R>,
    config: web::Data<Config>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError>
where
    R: StaffRepository + 'static,
{
    info!("Login request received");
    let next = safe_next(form.next.as_deref());

    if form.username.trim().is_empty() || form.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Ok(login_page(Some(BAD_CREDENTIALS), next));
    }

    debug!("Fetching staff user");
    let user = match repo.find_staff_by_username(form.username.trim()).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Ok(login_page(Some(BAD_CREDENTIALS), next));
        }
    };

    if let Err(e) = verify_password(&form.password, &user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Ok(login_page(Some(BAD_CREDENTIALS), next));
    }

    if !user.can_download_reports() {
        info!(user_id = user.id, "Login refused: not active staff");
        return Ok(login_page(Some(BAD_CREDENTIALS), next));
    }

    let (token, claims) = generate_session_token(
        user.id,
        user.username.clone(),
        user.is_staff,
        &config.jwt_secret,
        config.session_ttl,
    )
    .map_err(AppError::internal)?;

    // non-fatal
    if let Err(e) = repo.touch_last_login(user.id).await {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(jti = %claims.jti, "Login successful");

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(Duration::seconds(config.session_ttl as i64))
        .finish();

    let mut resp = see_other(next);
    resp.add_cookie(&cookie).map_err(AppError::internal)?;
    Ok(resp)
}

/// POST /accounts/logout
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    let mut resp = see_other(LOGIN_PATH);
    if let Err(e) = resp.add_cookie(&cookie) {
        error!(error = %e, "Failed to clear session cookie");
    }
    resp
}
