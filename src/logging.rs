use std::fs;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, field, info, info_span, warn};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use istack_config::LogConfig;

/// Logs every request inside an `http.request` span.
///
/// The span carries a generated request id, the method, the matched path
/// and the peer address when the server was started with connect info.
/// `user` and `session_id` are filled in by the route guard.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    let span = info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        remote_addr = remote_addr.as_deref().unwrap_or("-"),
        user = field::Empty,
        session_id = field::Empty,
        auth.success = field::Empty,
    );

    async move {
        info!("Incoming request");

        let response = next.run(req).await;
        let latency_ms = start.elapsed().as_millis();
        let status = response.status().as_u16();

        match status {
            400..=499 => warn!(status, latency_ms, "Client error"),
            500..=599 => error!(status, latency_ms, "Server error"),
            _ => info!(status, latency_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await
}

/// Installs the global tracing subscriber.
///
/// - Console: compact, filtered by `RUST_LOG` or else `LOG_LEVEL` for this
///   crate's targets
/// - JSON file: enabled when `LOG_FILE` is set, at the same level, with the
///   current span's fields (request id, user, session id) on each line
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let json_layer = match config.file_parts() {
        Some((dir, file_name)) => {
            fs::create_dir_all(&dir)?;
            let appender =
                RollingFileAppender::new(config.rotation.as_rotation(), dir, file_name);

            Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_ansi(false)
                    .with_filter(default_filter(&config.level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .try_init()?;

    info!(
        level = %config.level,
        log_file = ?config.file,
        "Tracing initialized"
    );
    Ok(())
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{}={level},istack_auth={level},tower_http=warn,hyper=warn",
        env!("CARGO_CRATE_NAME")
    ))
}
