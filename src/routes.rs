use crate::{
    api::{attendance, fingerprint, reports, staff},
    auth::middleware::staff_middleware,
    config::Config,
    repository::{AttendanceRepository, StaffRepository},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure<R>(cfg: &mut web::ServiceConfig, config: Config)
where
    R: AttendanceRepository + StaffRepository + 'static,
{
    let checkin_limiter = Arc::new(build_limiter(config.rate_checkin_per_min));
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    // Check-in pages (public)
    cfg.service(
        web::resource("/")
            .wrap(checkin_limiter.clone())
            .route(web::get().to(attendance::show_form::<R>))
            .route(web::post().to(attendance::submit_form::<R>)),
    )
    .service(
        web::resource("/qr/checkin")
            .wrap(checkin_limiter)
            .route(web::get().to(attendance::show_kiosk::<R>))
            .route(web::post().to(attendance::submit_kiosk::<R>)),
    );

    // Device fingerprint API (public, JSON)
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter)
            .service(
                web::scope("/fingerprint")
                    .route("/identify", web::post().to(fingerprint::identify::<R>))
                    .route("/bind", web::post().to(fingerprint::bind::<R>)),
            ),
    );

    // Staff session
    cfg.service(
        web::scope("/accounts")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::get().to(staff::show_login))
                    .route(web::post().to(staff::login::<R>)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(staff::logout)),
            ),
    );

    // Staff-only downloads
    cfg.service(
        web::scope("/login")
            .wrap(from_fn(staff_middleware))
            .route("/descarga", web::get().to(reports::download_page))
            .route("/descargar/asistencia", web::get().to(reports::download_records::<R>))
            .route("/descargar/resumen", web::get().to(reports::download_summary::<R>))
            .route("/qr", web::get().to(reports::kiosk_qr)),
    );
}

// CHECK-IN
//  ├─ GET/POST /            (form)
//  └─ GET/POST /qr/checkin  (kiosk, device fingerprint)

// STAFF
//  ├─ POST /accounts/login  -> session cookie
//  └─ GET  /login/...       (cookie or Authorization: Bearer)
