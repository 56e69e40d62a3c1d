//! REST client for the fee rule service (spec §4.4), grounded on the
//! retrieval client's retry pattern.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chat_domain::config::FeeConfig;
use chat_domain::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::types::FeeRule;

#[async_trait]
pub trait FeeRuleSource: Send + Sync {
    async fn rules_for(&self, charge_type: &str) -> Result<Vec<FeeRule>>;
}

#[derive(Debug, Clone)]
pub struct RestFeeService {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RestFeeService {
    pub fn new(cfg: &FeeConfig) -> Result<Self> {
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
            max_retries: 1,
        })
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
                    tracing::debug!(endpoint, status = status.as_u16(), duration_ms, "fee service call");

                    if status.is_server_error() {
                        last_err = Some(Error::AuthoritativeError {
                            source_name: "fee".to_owned(),
                            message: format!("{endpoint} returned {status}"),
                        });
                        continue;
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(Error::AuthoritativeNotFound(format!("{endpoint}: no rules")));
                    }
                    if status.is_client_error() {
                        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS {
                            last_err = Some(Error::Timeout(format!("{endpoint}: {status}")));
                            continue;
                        }
                        return Err(Error::AuthoritativeError {
                            source_name: "fee".to_owned(),
                            message: format!("{endpoint} returned {status}"),
                        });
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, duration_ms, error = %e, "fee service call failed");
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::AuthoritativeError {
                source_name: "fee".to_owned(),
                message: format!("{endpoint}: all retries exhausted"),
            }))
    }
}

#[async_trait]
impl FeeRuleSource for RestFeeService {
    async fn rules_for(&self, charge_type: &str) -> Result<Vec<FeeRule>> {
        let url = format!("{}/fees", self.base_url);
        let resp = self
            .execute_with_retry("GET /fees", || {
                self.http.get(&url).query(&[("chargeType", charge_type)])
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let rules: Vec<FeeRule> = serde_json::from_str(&body).map_err(|e| Error::AuthoritativeError {
            source_name: "fee".to_owned(),
            message: format!("failed to parse fee rules: {e}: {body}"),
        })?;
        Ok(rules)
    }
}

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::AuthoritativeError {
            source_name: "fee".to_owned(),
            message: e.to_string(),
        }
    }
}
