//! Tracing/logging bootstrap (spec SPEC_FULL.md §1.1). Structured JSON
//! logs always; OTLP span export is additionally wired up when
//! `observability.otlp_endpoint` is set, so a deployment with no
//! collector configured pays none of the OTLP setup cost.

use chat_domain::config::ObservabilityConfig;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Holds the OTLP tracer provider alive for the process lifetime; the
/// exporter stops flushing once this is dropped, so `main` keeps it
/// bound until shutdown.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "error shutting down OTLP tracer provider");
            }
        }
    }
}

pub fn init(config: &ObservabilityConfig) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,chat_gateway=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer().json();

    let Some(endpoint) = config.otlp_endpoint.clone() else {
        Registry::default().with(env_filter).with(fmt_layer).init();
        return TelemetryGuard { provider: None };
    };

    let exporter_result = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build();

    let exporter = match exporter_result {
        Ok(exporter) => exporter,
        Err(e) => {
            Registry::default().with(env_filter).with(fmt_layer).init();
            tracing::error!(endpoint = %endpoint, error = %e, "failed to build OTLP exporter, tracing to stdout only");
            return TelemetryGuard { provider: None };
        }
    };

    let resource = Resource::builder().with_service_name(config.service_name.clone()).build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::TraceIdRatioBased(config.sample_rate))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    let tracer = provider.tracer("chat-gateway");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    tracing::info!(endpoint = %endpoint, service = %config.service_name, "OTLP trace export enabled");

    TelemetryGuard {
        provider: Some(provider),
    }
}
