use crate::auth::SESSION_COOKIE;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// A logged-in staff member, placed in request extensions by the staff middleware.
#[derive(Debug, Clone)]
pub struct StaffSession {
    pub user_id: u64,
    pub username: String,
}

/// Session token from the cookie, or from an `Authorization: Bearer` header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl FromRequest for StaffSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<StaffSession>() {
            Some(session) => ready(Ok(session.clone())),
            None => ready(Err(ErrorUnauthorized("Missing session"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn session_comes_from_request_extensions() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(StaffSession {
            user_id: 4,
            username: "rrhh".into(),
        });

        let session = StaffSession::extract(&req).await.unwrap();
        assert_eq!(session.user_id, 4);
        assert_eq!(session.username, "rrhh");
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = StaffSession::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn token_is_read_from_cookie_then_bearer_header() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .insert_header(("Authorization", "Bearer from-header"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("from-cookie"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer from-header"))
            .to_http_request();
        assert_eq!(session_token(&req).as_deref(), Some("from-header"));

        assert_eq!(session_token(&TestRequest::default().to_http_request()), None);
    }
}
