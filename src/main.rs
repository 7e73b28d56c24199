use std::io;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use rust_marksystem::config::AppConfig;
use rust_marksystem::routes;
use rust_marksystem::runtime::lifetime;
use rust_marksystem::utils::{json_error_handler, query_error_handler};

/// 开发环境输出带源码位置的彩色日志，其他环境输出 JSON
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .with_level(true);

    if config.is_development() {
        builder
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        builder.with_ansi(false).json().init();
    }
    guard
}

/// 未配置来源时允许任意来源
fn build_cors(config: &AppConfig) -> Cors {
    let origins = &config.cors.allowed_origins;
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allow_any_method()
        .allow_any_header()
        .max_age(config.cors.max_age)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    setup_panic!();
    let started = std::time::Instant::now();

    AppConfig::init().map_err(|e| io::Error::other(format!("配置加载失败: {e}")))?;
    let config = AppConfig::get();
    let _log_guard = init_tracing(config);

    warn!(
        "{} v{} starting ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );
    if config.is_production() && config.uses_default_jwt_secret() {
        warn!("JWT_SECRET is not set, tokens are signed with the development secret");
    }

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| io::Error::other(e.format_simple()))?;
    info!(
        "Startup finished in {} ms, {} workers",
        started.elapsed().as_millis(),
        config.server.workers
    );

    let storage = web::Data::new(startup.storage);
    let mailer = web::Data::new(startup.mailer);
    let limits = config.server.limits.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(
                web::JsonConfig::default()
                    .limit(limits.max_payload_size)
                    .error_handler(json_error_handler),
            )
            .app_data(web::PayloadConfig::new(limits.max_payload_size))
            .app_data(storage.clone())
            .app_data(mailer.clone())
            .configure(routes::configure_routes)
    })
    .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(
        config.server.timeouts.client_disconnect,
    ))
    .workers(config.server.workers);

    #[cfg(unix)]
    let socket_path = config.unix_socket_path();
    #[cfg(not(unix))]
    let socket_path: Option<&str> = None;

    // 配置了 Unix 套接字时优先绑定套接字
    let server = match socket_path {
        #[cfg(unix)]
        Some(path) => {
            if std::path::Path::new(path).exists() {
                std::fs::remove_file(path)?;
            }
            warn!("Listening on Unix socket {}", path);
            server.bind_uds(path)?
        }
        _ => {
            let address = config.server_bind_address();
            warn!("Listening on http://{}", address);
            server.bind(address)?
        }
    }
    .run();

    tokio::select! {
        res = server => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown signal received, server stopped");
        }
    }

    Ok(())
}
