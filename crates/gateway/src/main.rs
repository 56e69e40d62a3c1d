use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use chat_domain::ConfigSeverity;
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};

use chat_gateway::cli::{Cli, Command};
use chat_gateway::state::AppState;
use chat_gateway::{api, bootstrap, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => {
            let (config, _path) = chat_gateway::cli::load_config()?;
            let _telemetry = telemetry::init(&config.observability);
            run_server(config).await
        }
        Some(Command::ConfigValidate) => {
            let (config, config_path) = chat_gateway::cli::load_config()?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            let has_error = issues.iter().any(|i| i.severity == ConfigSeverity::Error);
            if has_error {
                println!("config at {config_path} has validation errors");
                std::process::exit(1);
            }
            println!("config at {config_path} is valid");
            Ok(())
        }
        Some(Command::ConfigShow) => {
            let (config, _path) = chat_gateway::cli::load_config()?;
            println!("{}", toml::to_string_pretty(&config).context("serializing config")?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("chat-gateway {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_server(config: chat_domain::Config) -> anyhow::Result<()> {
    tracing::info!("chat orchestrator starting");

    bootstrap::validate_and_log(&config)?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let cors = config.server.cors.clone();
    let rate_limit = config.server.rate_limit.clone();

    let state: AppState = bootstrap::build_state(config).context("building application state")?;

    // Periodic pruning of idle per-conversation-key locks, mirroring the
    // teacher's own session-lock pruning sweep.
    {
        let locks = state.conversation_locks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                locks.prune_idle();
            }
        });
    }

    // Periodic TTL sweeps for the Retrieval Cache and the Disambiguation
    // Store's in-process fallback, same pattern as the lock-pruning
    // task above — both already evict lazily on access, but a quiet
    // fingerprint or conversation key that's never looked up again would
    // otherwise sit in memory until the next access forces it out.
    {
        let retrieval = state.retrieval.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                retrieval.sweep_cache_expired();
            }
        });
    }
    {
        let disambiguation = state.disambiguation.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                disambiguation.sweep_local_expired();
            }
        });
    }

    let cors_layer = build_cors_layer(&cors);

    let max_concurrent = std::env::var("CHAT_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(256);
    tracing::info!(max_concurrent, "concurrency limit set");

    let governor_layer = rate_limit.as_ref().map(|rl| {
        use tower_governor::governor::GovernorConfigBuilder;
        use tower_governor::GovernorLayer;

        let gov_config = GovernorConfigBuilder::default()
            .per_second(rl.requests_per_second)
            .burst_size(rl.burst_size)
            .finish()
            .expect("rate_limit: requests_per_second and burst_size must be > 0");

        tracing::info!(
            requests_per_second = rl.requests_per_second,
            burst_size = rl.burst_size,
            "per-IP rate limiting enabled"
        );

        GovernorLayer {
            config: Arc::new(gov_config),
        }
    });
    if governor_layer.is_none() {
        tracing::info!("per-IP rate limiting disabled (no [server.rate_limit] in config)");
    }

    let router = api::router(state.clone())
        .layer(cors_layer)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent));
    let app = if let Some(gov) = governor_layer {
        router.layer(gov).with_state(state)
    } else {
        router.with_state(state)
    };

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding to {addr}"))?;

    tracing::info!(%addr, "chat orchestrator listening");

    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}

/// Builds a [`CorsLayer`] from the configured allowed origins. Origins may
/// carry a trailing `:*` wildcard for the port segment (e.g.
/// `http://localhost:*`), expanded into a predicate that matches any port
/// on that host. A literal `"*"` allows all origins.
fn build_cors_layer(cors: &chat_domain::config::CorsConfig) -> CorsLayer {
    use axum::http::header;

    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\" — all origins allowed");
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if origin.ends_with(":*") {
            let prefix = origin.trim_end_matches('*').to_owned();
            wildcard_prefixes.push(prefix);
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .map(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
                    .unwrap_or(false)
            })
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
