use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::auth::StaffSession;
use crate::config::Config;
use crate::error::AppError;
use crate::export::{self, RECORDS_FILENAME, SUMMARY_FILENAME, XLSX_CONTENT_TYPE};
use crate::qr::kiosk_qr_svg;
use crate::repository::AttendanceRepository;
use crate::service::report::daily_summaries;
use crate::views;

fn attachment(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename.to_string())],
            },
        ))
        .body(bytes)
}

/// GET /login/descarga
pub async fn download_page(session: StaffSession) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(views::download_page(&session.username))
}

/// GET /login/descargar/asistencia: every punch as a spreadsheet
pub async fn download_records<R>(
    session: StaffSession,
    repo: web::Data<R>,
) -> Result<HttpResponse, AppError>
where
    R: AttendanceRepository + 'static,
{
    let rows = repo.list_records_newest_first().await?;
    let bytes = export::write_workbook(&export::records_sheet(&rows))?;

    info!(username = %session.username, rows = rows.len(), "Attendance records exported");
    Ok(attachment(bytes, RECORDS_FILENAME))
}

/// GET /login/descargar/resumen: hours per employee and day
pub async fn download_summary<R>(
    session: StaffSession,
    repo: web::Data<R>,
) -> Result<HttpResponse, AppError>
where
    R: AttendanceRepository + 'static,
{
    let rows = repo.list_records_by_employee_day().await?;
    let summaries = daily_summaries(&rows);
    let bytes = export::write_workbook(&export::summary_sheet(&summaries))?;

    info!(username = %session.username, days = summaries.len(), "Daily summary exported");
    Ok(attachment(bytes, SUMMARY_FILENAME))
}

/// GET /login/qr
pub async fn kiosk_qr(config: web::Data<Config>) -> Result<HttpResponse, AppError> {
    let svg = kiosk_qr_svg(&config.kiosk_url()).map_err(AppError::internal)?;
    Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SESSION_COOKIE;
    use crate::auth::jwt::generate_session_token;
    use crate::auth::middleware::staff_middleware;
    use crate::model::attendance_type::PunchKind;
    use crate::repository::memory::MemoryStore;
    use actix_web::cookie::Cookie;
    use actix_web::middleware::from_fn;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".into()),
            "DATABASE_URL" => Some("mysql://localhost/test".into()),
            "JWT_SECRET" => Some("secret".into()),
            "APP_URL" => Some("https://asistencia.example.com".into()),
            _ => None,
        })
        .unwrap()
    }

    fn session_cookie(is_staff: bool) -> Cookie<'static> {
        let (token, _) = generate_session_token(1, "rrhh".into(), is_staff, "secret", 600).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::from($store.clone()))
                    .app_data(Data::new(config()))
                    .service(
                        web::scope("/login")
                            .wrap(from_fn(staff_middleware))
                            .route("/descarga", web::get().to(download_page))
                            .route("/descargar/asistencia", web::get().to(download_records::<MemoryStore>))
                            .route("/descargar/resumen", web::get().to(download_summary::<MemoryStore>))
                            .route("/qr", web::get().to(kiosk_qr)),
                    ),
            )
            .await
        };
    }

    fn store_with_a_day() -> Arc<MemoryStore> {
        let store = MemoryStore::seeded();
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        for (kind, hms) in [
            (PunchKind::Entrada, (8, 0, 0)),
            (PunchKind::InicioAlmuerzo, (13, 0, 0)),
            (PunchKind::FinAlmuerzo, (14, 0, 0)),
            (PunchKind::Salida, (17, 0, 0)),
        ] {
            let at = day.and_hms_opt(hms.0, hms.1, hms.2).unwrap();
            store.push_record(1, kind, at, None);
        }
        Arc::new(store)
    }

    #[actix_web::test]
    async fn anonymous_visitors_are_sent_to_login() {
        let store = store_with_a_day();
        let app = app!(store);

        let req = test::TestRequest::get().uri("/login/descargar/resumen").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=%2Flogin%2Fdescargar%2Fresumen"
        );
    }

    #[actix_web::test]
    async fn non_staff_sessions_are_forbidden() {
        let store = store_with_a_day();
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/login/descarga")
            .cookie(session_cookie(false))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn staff_gets_the_download_page() {
        let store = store_with_a_day();
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/login/descarga")
            .cookie(session_cookie(true))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("rrhh"));
        assert!(body.contains("/login/descargar/asistencia"));
    }

    #[actix_web::test]
    async fn staff_downloads_both_workbooks() {
        let store = store_with_a_day();
        let app = app!(store);

        for (uri, filename) in [
            ("/login/descargar/asistencia", RECORDS_FILENAME),
            ("/login/descargar/resumen", SUMMARY_FILENAME),
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .cookie(session_cookie(true))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().get(header::CONTENT_TYPE).unwrap(),
                XLSX_CONTENT_TYPE
            );
            let disposition = resp
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            assert!(disposition.starts_with("attachment"));
            assert!(disposition.contains(filename));

            let body = test::read_body(resp).await;
            assert!(body.starts_with(b"PK"));
        }
    }

    #[actix_web::test]
    async fn storage_failure_is_a_server_error() {
        let store = Arc::new(MemoryStore {
            broken: true,
            ..MemoryStore::seeded()
        });
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/login/descargar/asistencia")
            .cookie(session_cookie(true))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn qr_is_served_as_svg() {
        let store = store_with_a_day();
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/login/qr")
            .cookie(session_cookie(true))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/svg+xml");
    }
}
