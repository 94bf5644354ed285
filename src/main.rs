use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;
use std::io;

use asistencia::config::Config;
use asistencia::db::{init_db, run_migrations};
use asistencia::docs::api_doc;
use asistencia::repository::mysql::MySqlStore;
use asistencia::routes;
use asistencia::utils::fingerprint_cache::FingerprintCache;

use tracing::{error, info};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let config = Config::from_env().map_err(|e| io::Error::other(format!("{e:#}")))?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .map_err(|e| io::Error::other(format!("{e:#}")))?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| io::Error::other(format!("{e:#}")))?;
    }

    let store = Data::new(MySqlStore::new(pool.clone()));
    let cache = FingerprintCache::default();

    let cache_for_warmup = cache.clone();
    actix_web::rt::spawn(async move {
        // Warm up devices bound in the last 30 days, in batches of 250
        if let Err(e) = cache_for_warmup.warmup(&pool, 30, 250).await {
            error!(error = %e, "Failed to warm up fingerprint cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let cache = Data::new(cache);
    let config_data = Data::new(config.clone());
    let openapi = api_doc(&config.api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(store.clone())
            .app_data(config_data.clone())
            .app_data(cache.clone())
            .configure(|cfg| routes::configure::<MySqlStore>(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
