//! REST-backed [`DisambiguationStore`] against a network key-value
//! store, grounded on the same retry pattern the Directory/Fee/Location
//! clients use (spec §4.7 "Persistence": a primary-store failure must
//! surface as `Err` so `DisambiguationMachine` falls back to its local
//! store rather than silently losing state).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chat_domain::config::DisambiguationConfig;
use chat_domain::{DisambiguationState, Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;

use crate::store::DisambiguationStore;

#[derive(Debug, Clone)]
pub struct RestDisambiguationStore {
    http: Client,
    base_url: String,
    max_retries: u32,
}

impl RestDisambiguationStore {
    pub fn new(cfg: &DisambiguationConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.store_url.trim_end_matches('/').to_owned(),
            max_retries: 1,
        })
    }

    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt - 1))).await;
            }

            let start = Instant::now();
            let result = build_request().send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    tracing::debug!(endpoint, status = status.as_u16(), duration_ms, "disambiguation store call");

                    if status.is_server_error() {
                        last_err = Some(Error::DisambiguationStore(format!("{endpoint} returned {status}")));
                        continue;
                    }
                    if status.is_client_error() {
                        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS {
                            last_err = Some(Error::DisambiguationStore(format!("{endpoint}: {status}")));
                            continue;
                        }
                        return Err(Error::DisambiguationStore(format!("{endpoint} returned {status}")));
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, duration_ms, error = %e, "disambiguation store call failed");
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::DisambiguationStore(format!("{endpoint}: all retries exhausted"))))
    }
}

#[async_trait]
impl DisambiguationStore for RestDisambiguationStore {
    async fn get(&self, conversation_key: &str) -> Result<Option<DisambiguationState>> {
        let url = format!("{}/disambiguation/{}", self.base_url, conversation_key);
        let resp = self
            .execute_with_retry("GET /disambiguation/:key", || self.http.get(&url))
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text().await.map_err(from_reqwest)?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| Error::DisambiguationStore(format!("failed to parse disambiguation state: {e}: {body}")))
    }

    async fn put(&self, conversation_key: &str, state: DisambiguationState, ttl_seconds: u64) -> Result<()> {
        let url = format!("{}/disambiguation/{}", self.base_url, conversation_key);
        let payload = json!({ "state": state, "ttl_seconds": ttl_seconds });
        self.execute_with_retry("PUT /disambiguation/:key", || self.http.put(&url).json(&payload))
            .await?;
        Ok(())
    }

    async fn delete(&self, conversation_key: &str) -> Result<()> {
        let url = format!("{}/disambiguation/{}", self.base_url, conversation_key);
        self.execute_with_retry("DELETE /disambiguation/:key", || self.http.delete(&url))
            .await?;
        Ok(())
    }
}

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::DisambiguationStore(format!("timeout: {e}"))
    } else {
        Error::DisambiguationStore(e.to_string())
    }
}
