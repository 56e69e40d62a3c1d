mod cache;
mod directory;
mod disambiguation;
mod fee;
mod generative;
mod location;
mod memory;
mod observability;
mod orchestrator;
mod retrieval;
mod server;

pub use cache::*;
pub use directory::*;
pub use disambiguation::*;
pub use fee::*;
pub use generative::*;
pub use location::*;
pub use memory::*;
pub use observability::*;
pub use orchestrator::*;
pub use retrieval::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub disambiguation: DisambiguationConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub generative: GenerativeConfig,
    #[serde(default)]
    pub fee: FeeConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // ── Server ───────────────────────────────────────────────────
        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }
        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)"
                    .into(),
            });
        }
        if let Some(rl) = &self.server.rate_limit {
            if rl.requests_per_second == 0 {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "server.rate_limit.requests_per_second".into(),
                    message: "requests_per_second must be greater than 0".into(),
                });
            }
            if rl.burst_size == 0 {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "server.rate_limit.burst_size".into(),
                    message: "burst_size must be greater than 0".into(),
                });
            }
        }

        // ── Retrieval ────────────────────────────────────────────────
        if self.retrieval.url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "retrieval.url".into(),
                message: "no retrieval service configured — knowledge-base answers will fall back to an apology".into(),
            });
        } else if !is_http_url(&self.retrieval.url) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "retrieval.url".into(),
                message: format!(
                    "url must start with http:// or https:// (got \"{}\")",
                    self.retrieval.url
                ),
            });
        }
        if self.retrieval.default_kb.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "retrieval.default_kb".into(),
                message: "default_kb must not be empty".into(),
            });
        }
        if self.retrieval.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "retrieval.timeout_ms".into(),
                message: "timeout_ms must be greater than 0".into(),
            });
        }
        if self.retrieval.max_concurrency == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "retrieval.max_concurrency".into(),
                message: "max_concurrency must be greater than 0".into(),
            });
        }

        // ── Cache ────────────────────────────────────────────────────
        if self.cache.ttl_seconds == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "cache.ttl_seconds".into(),
                message: "ttl_seconds must be greater than 0".into(),
            });
        }

        // ── Disambiguation ───────────────────────────────────────────
        if self.disambiguation.ttl_seconds == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "disambiguation.ttl_seconds".into(),
                message: "ttl_seconds must be greater than 0".into(),
            });
        }
        if !self.disambiguation.store_url.is_empty() {
            errors_push_opt(
                &mut errors,
                check_url("disambiguation.store_url", &self.disambiguation.store_url),
            );
        }

        // ── Memory ───────────────────────────────────────────────────
        if self.memory.fallback_capacity == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "memory.fallback_capacity".into(),
                message: "fallback_capacity must be greater than 0".into(),
            });
        }
        if self.memory.connection_string.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "memory.connection_string".into(),
                message: "no durable session store configured — falling back to the in-memory store for every turn".into(),
            });
        }

        // ── Generative ───────────────────────────────────────────────
        if self.generative.model.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "generative.model".into(),
                message: "model must not be empty".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.generative.temperature) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "generative.temperature".into(),
                message: format!(
                    "temperature must be within [0.0, 2.0] (got {})",
                    self.generative.temperature
                ),
            });
        }
        if self.generative.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "generative.base_url".into(),
                message: "no generative backend configured".into(),
            });
        } else if !is_http_url(&self.generative.base_url) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "generative.base_url".into(),
                message: format!(
                    "base_url must start with http:// or https:// (got \"{}\")",
                    self.generative.base_url
                ),
            });
        }

        // ── Fee / Location ───────────────────────────────────────────
        if !self.fee.url.is_empty() && !is_http_url(&self.fee.url) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "fee.url".into(),
                message: format!("url must start with http:// or https:// (got \"{}\")", self.fee.url),
            });
        }
        if !self.location.url.is_empty() && !is_http_url(&self.location.url) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "location.url".into(),
                message: format!(
                    "url must start with http:// or https:// (got \"{}\")",
                    self.location.url
                ),
            });
        }

        // ── Directory ────────────────────────────────────────────────
        if self.directory.limit == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "directory.limit".into(),
                message: "limit must be greater than 0".into(),
            });
        }

        // ── Orchestrator ─────────────────────────────────────────────
        if self.orchestrator.max_history_turns == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "orchestrator.max_history_turns".into(),
                message: "max_history_turns must be greater than 0".into(),
            });
        }
        if self.orchestrator.per_call_timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "orchestrator.per_call_timeout_ms".into(),
                message: "per_call_timeout_ms must be greater than 0".into(),
            });
        }
        if self.orchestrator.retry_count > 1 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "orchestrator.retry_count".into(),
                message: "at most one retry is permitted for idempotent collaborator calls".into(),
            });
        }

        errors
    }
}

fn check_url(field: &str, url: &str) -> Option<ConfigError> {
    if is_http_url(url) {
        None
    } else {
        Some(ConfigError {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: format!("url must start with http:// or https:// (got \"{url}\")"),
        })
    }
}

fn errors_push_opt(errors: &mut Vec<ConfigError>, e: Option<ConfigError>) {
    if let Some(e) = e {
        errors.push(e);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a minimal valid Config.
    fn valid_config() -> Config {
        Config {
            server: ServerConfig {
                port: 8080,
                host: "0.0.0.0".into(),
                ..ServerConfig::default()
            },
            retrieval: RetrievalConfig {
                url: "https://retrieval.internal.example".into(),
                ..RetrievalConfig::default()
            },
            generative: GenerativeConfig {
                base_url: "https://generative.internal.example".into(),
                ..GenerativeConfig::default()
            },
            memory: MemoryConfig {
                connection_string: "postgres://localhost/chat".into(),
                ..MemoryConfig::default()
            },
            ..Config::default()
        }
    }

    fn find_issue<'a>(issues: &'a [ConfigError], field_prefix: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|e| e.field.starts_with(field_prefix))
    }

    #[test]
    fn valid_config_passes() {
        let issues = valid_config().validate();
        let errors: Vec<_> = issues
            .iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn server_port_zero_is_error() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        let issue = find_issue(&cfg.validate(), "server.port").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn retrieval_url_invalid_scheme_is_error() {
        let mut cfg = valid_config();
        cfg.retrieval.url = "ftp://retrieval".into();
        let issue = find_issue(&cfg.validate(), "retrieval.url").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn retrieval_url_empty_is_warning_not_error() {
        let mut cfg = valid_config();
        cfg.retrieval.url = String::new();
        let issue = find_issue(&cfg.validate(), "retrieval.url").expect("expected warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn cache_ttl_zero_is_error() {
        let mut cfg = valid_config();
        cfg.cache.ttl_seconds = 0;
        let issue = find_issue(&cfg.validate(), "cache.ttl_seconds").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn disambiguation_ttl_zero_is_error() {
        let mut cfg = valid_config();
        cfg.disambiguation.ttl_seconds = 0;
        let issue =
            find_issue(&cfg.validate(), "disambiguation.ttl_seconds").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn generative_temperature_out_of_range_is_error() {
        let mut cfg = valid_config();
        cfg.generative.temperature = 3.5;
        let issue =
            find_issue(&cfg.validate(), "generative.temperature").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn generative_model_empty_is_error() {
        let mut cfg = valid_config();
        cfg.generative.model = String::new();
        let issue = find_issue(&cfg.validate(), "generative.model").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn orchestrator_retry_count_above_one_is_error() {
        let mut cfg = valid_config();
        cfg.orchestrator.retry_count = 2;
        let issue =
            find_issue(&cfg.validate(), "orchestrator.retry_count").expect("expected error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn orchestrator_retry_count_one_is_ok() {
        let mut cfg = valid_config();
        cfg.orchestrator.retry_count = 1;
        assert!(find_issue(&cfg.validate(), "orchestrator.retry_count").is_none());
    }

    #[test]
    fn cors_wildcard_is_warning() {
        let mut cfg = valid_config();
        cfg.server.cors.allowed_origins = vec!["*".into()];
        let issue =
            find_issue(&cfg.validate(), "server.cors.allowed_origins").expect("expected warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn memory_connection_string_empty_is_warning() {
        let mut cfg = valid_config();
        cfg.memory.connection_string = String::new();
        let issue =
            find_issue(&cfg.validate(), "memory.connection_string").expect("expected warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn config_error_display_format() {
        let err = ConfigError {
            severity: ConfigSeverity::Error,
            field: "server.port".into(),
            message: "port must be greater than 0".into(),
        };
        assert_eq!(
            format!("{err}"),
            "[ERROR] server.port: port must be greater than 0"
        );
    }
}
