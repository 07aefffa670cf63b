use std::time::Duration;

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use consultancy_backend::{
    background_task::start_purge_task,
    graceful_shutdown::shutdown_signal,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if production {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::new();
    init_tracing(config.as_ref().is_ok_and(|cfg| cfg.is_production()));

    let config = match config {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);
    let workers = config.worker_count;
    let purge_every = Duration::from_secs(config.rate_limit.purge_interval_secs.max(1));

    let app_state = match AppState::new(config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Startup error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Some(limiter) = app_state.rate_limiter().in_memory() {
        tokio::spawn(start_purge_task(limiter.clone(), purge_every));
    }

    tracing::info!(
        "🚀 Starting {} v{} on {} (rate limiter: {})",
        app_state.config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        app_state.rate_limiter().kind()
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(workers)
    .disable_signals()
    .bind(server_addr)?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        handle.stop(true).await;
    });

    server.await
}
