//! REST implementation of [`DirectoryStore`] against the employee
//! directory service, grounded on the same retry pattern used by the
//! Fee and Location Clients (spec §4.2 "Failure semantics": a store
//! failure must surface as `Err`, never as an empty result).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chat_domain::config::DirectoryConfig;
use chat_domain::{Employee, Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::store::DirectoryStore;

#[derive(Debug, Clone)]
pub struct RestDirectoryStore {
    http: Client,
    base_url: String,
    max_retries: u32,
}

impl RestDirectoryStore {
    pub fn new(cfg: &DirectoryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.connection_string.trim_end_matches('/').to_owned(),
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
                    tracing::debug!(endpoint, status = status.as_u16(), duration_ms, "directory call");

                    if status.is_server_error() {
                        last_err = Some(Error::AuthoritativeError {
                            source_name: "directory".to_owned(),
                            message: format!("{endpoint} returned {status}"),
                        });
                        continue;
                    }
                    if status.is_client_error() {
                        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS {
                            last_err = Some(Error::Timeout(format!("{endpoint}: {status}")));
                            continue;
                        }
                        return Err(Error::AuthoritativeError {
                            source_name: "directory".to_owned(),
                            message: format!("{endpoint} returned {status}"),
                        });
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, duration_ms, error = %e, "directory call failed");
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::AuthoritativeError {
            source_name: "directory".to_owned(),
            message: format!("{endpoint}: all retries exhausted"),
        }))
    }
}

#[async_trait]
impl DirectoryStore for RestDirectoryStore {
    async fn all_employees(&self) -> Result<Vec<Employee>> {
        let url = format!("{}/employees", self.base_url);
        let resp = self
            .execute_with_retry("GET /employees", || self.http.get(&url))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| Error::AuthoritativeError {
            source_name: "directory".to_owned(),
            message: format!("failed to parse directory response: {e}: {body}"),
        })
    }
}

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::AuthoritativeError {
            source_name: "directory".to_owned(),
            message: e.to_string(),
        }
    }
}

/// Fixed in-process directory store, useful for local/demo deployments
/// where employee records are seeded from a config file rather than a
/// live datastore.
pub struct StaticDirectoryStore {
    employees: Vec<Employee>,
}

impl StaticDirectoryStore {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }
}

#[async_trait]
impl DirectoryStore for StaticDirectoryStore {
    async fn all_employees(&self) -> Result<Vec<Employee>> {
        Ok(self.employees.clone())
    }
}
