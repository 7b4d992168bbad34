use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use gatehouse_config::ServerConfig;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    response
}

/// Keeps the background log writers alive; drop on shutdown to flush.
pub struct LogGuards {
    _file: WorkerGuard,
    _json: WorkerGuard,
}

/// Console output plus daily-rolling plain and JSON files under `log_dir`.
///
/// `RUST_LOG` wins when set; otherwise `log_level` applies to the service
/// crates.
pub fn init_tracing(config: &ServerConfig) -> std::io::Result<LogGuards> {
    std::fs::create_dir_all(&config.log_dir)?;

    let default_filter = format!(
        "{name}={level},gatehouse_auth={level},gatehouse_db={level},tower_http=warn",
        name = env!("CARGO_CRATE_NAME"),
        level = config.log_level,
    );
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    // Errors only, human readable
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "gatehouse.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_appender =
        RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "gatehouse.json");
    let (json_writer, json_guard) = tracing_appender::non_blocking(json_appender);
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    Ok(LogGuards {
        _file: file_guard,
        _json: json_guard,
    })
}
