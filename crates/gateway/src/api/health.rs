//! Health endpoints (spec §6): `GET /health` is a liveness probe that
//! never touches a collaborator; `GET /health/detailed` probes every
//! configured collaborator's reachability. Grounded in the teacher's
//! `/v1/health` + `/v1/models/readiness` split — no collaborator trait
//! in this orchestrator exposes a ping method, so detailed checks are a
//! raw low-timeout HTTP HEAD/GET against the configured base URL rather
//! than a real business-logic call, to avoid side effects like cache
//! writes or spurious fee/location errors.

use std::time::{Duration, Instant};

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
struct CollaboratorStatus {
    reachable: bool,
    latency_ms: u64,
    last_error: Option<String>,
}

pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let (retrieval, fee, location, directory, generative) = tokio::join!(
        probe_url(&state.config.retrieval.url, "retrieval not configured"),
        probe_url(&state.config.fee.url, "fee service not configured"),
        probe_url(&state.config.location.url, "location service not configured"),
        probe_url(&state.config.directory.connection_string, "directory store not configured"),
        probe_url(&state.config.generative.base_url, "generative backend not configured"),
    );

    let memory = memory_status(&state);
    let cache = CollaboratorStatus {
        reachable: true,
        latency_ms: 0,
        last_error: None,
    };
    let disambiguation_store = probe_url(&state.config.disambiguation.store_url, "no network disambiguation store configured").await;

    Json(serde_json::json!({
        "retrieval": retrieval,
        "fee": fee,
        "location": location,
        "directory": directory,
        "generative": generative,
        "memory": memory,
        "cache": cache,
        "disambiguation_store": disambiguation_store,
    }))
}

/// A durable session store degrades gracefully to the in-memory fallback
/// (spec §2.6), so "unreachable" here means the filesystem path is
/// missing, not a hard failure — the turn orchestrator keeps working
/// either way.
fn memory_status(state: &AppState) -> CollaboratorStatus {
    let path = &state.config.memory.connection_string;
    if path.is_empty() {
        return CollaboratorStatus {
            reachable: true,
            latency_ms: 0,
            last_error: Some("no durable session store configured, using in-memory fallback".into()),
        };
    }
    let start = Instant::now();
    let reachable = std::path::Path::new(path).exists() || std::fs::create_dir_all(path).is_ok();
    CollaboratorStatus {
        reachable,
        latency_ms: start.elapsed().as_millis() as u64,
        last_error: if reachable { None } else { Some(format!("cannot access session store directory {path}")) },
    }
}

async fn probe_url(url: &str, unconfigured_message: &str) -> CollaboratorStatus {
    if url.is_empty() {
        return CollaboratorStatus {
            reachable: false,
            latency_ms: 0,
            last_error: Some(unconfigured_message.to_owned()),
        };
    }

    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            return CollaboratorStatus {
                reachable: false,
                latency_ms: 0,
                last_error: Some(e.to_string()),
            }
        }
    };

    let start = Instant::now();
    // Any HTTP response, including 404, means the collaborator is up and
    // answering requests — only a connection or timeout failure counts
    // as unreachable.
    match client.get(url).send().await {
        Ok(_) => CollaboratorStatus {
            reachable: true,
            latency_ms: start.elapsed().as_millis() as u64,
            last_error: None,
        },
        Err(e) => CollaboratorStatus {
            reachable: false,
            latency_ms: start.elapsed().as_millis() as u64,
            last_error: Some(e.to_string()),
        },
    }
}
