use crate::auth::auth::{StaffSession, session_token};
use crate::auth::jwt::verify_token;
use crate::auth::LOGIN_PATH;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    web::Data,
};
use tracing::{debug, warn};

/// Where anonymous visitors are sent, remembering the page they wanted.
pub fn login_redirect(next: &str) -> HttpResponse {
    let location = format!("{LOGIN_PATH}?next={}", encode_query_value(next));
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn encode_query_value(value: &str) -> String {
    serde_urlencoded::to_string(&[("v", value)])
        .map(|s| s.trim_start_matches("v=").to_string())
        .unwrap_or_default()
}

/// Guards staff-only pages: redirects to the login page without a valid
/// session, answers 403 for a session that is not staff.
pub async fn staff_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let claims = match session_token(req.request()) {
        Some(token) => match verify_token(&token, &config.jwt_secret) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, path = req.path(), "Invalid staff session");
                let resp = login_redirect(req.path());
                return Ok(req.into_response(resp.map_into_boxed_body()));
            }
        },
        None => {
            let resp = login_redirect(req.path());
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    if !claims.is_staff {
        warn!(username = %claims.sub, path = req.path(), "Non-staff user denied");
        let resp = HttpResponse::Forbidden().body("Acceso restringido al personal autorizado.");
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    req.extensions_mut().insert(StaffSession {
        user_id: claims.user_id,
        username: claims.sub,
    });

    next.call(req).await
}
