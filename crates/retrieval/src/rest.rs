//! REST implementation of [`RetrievalProvider`] against the knowledge
//! retrieval service, with retry + exponential back-off on transient
//! failures (grounded on the gateway's collaborator-client pattern).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chat_domain::config::RetrievalConfig;
use chat_domain::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::provider::RetrievalProvider;
use crate::types::{RetrievalRequest, RetrievalServiceResponse};

#[derive(Debug, Clone)]
pub struct RestRetrievalClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: u32,
}

impl RestRetrievalClient {
    pub fn new(cfg: &RetrievalConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let api_key = std::env::var(&cfg.api_key_env).ok();

        Ok(Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_owned(),
            api_key,
            timeout,
            // Transport-level transient retry; distinct from the
            // orchestrator's own one-retry policy for idempotent reads.
            max_retries: 1,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => rb.header("X-Api-Key", key),
            None => rb,
        }
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
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    tracing::debug!(endpoint, status = status.as_u16(), duration_ms, "retrieval call");

                    if status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Retrieval(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }
                    if status.is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS {
                            last_err = Some(Error::Timeout(format!("{endpoint}: {status}")));
                            continue;
                        }
                        return Err(Error::Retrieval(format!("{endpoint} returned {status}: {body}")));
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, duration_ms, error = %e, "retrieval call failed");
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Retrieval(format!("{endpoint}: all retries exhausted"))))
    }
}

#[async_trait]
impl RetrievalProvider for RestRetrievalClient {
    async fn query(&self, req: &RetrievalRequest) -> Result<RetrievalServiceResponse> {
        let url = format!("{}/query", self.base_url);
        let resp = self
            .execute_with_retry("POST /query", || self.http.post(&url).json(req))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Retrieval(format!("failed to parse retrieval response: {e}: {body}")))
    }
}

/// Convert a `reqwest::Error` into a domain `Error`. Timeouts become
/// `Error::Timeout`; everything else becomes `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
