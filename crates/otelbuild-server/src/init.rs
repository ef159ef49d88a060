// Initialization utilities for server mode
//
// Logging/tracing setup and OTLP span export wiring

use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;

use crate::config::{LogFormat, ServerConfig};

/// Initialize structured logging from ServerConfig
pub(crate) fn init_tracing(config: &ServerConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            registry.with(fmt::layer().json()).init();
        }
        LogFormat::Text => {
            registry.with(fmt::layer()).init();
        }
    }
}

/// Install the trace-context propagator and, when an OTLP endpoint is
/// configured, a batch tracer provider exporting request spans.
///
/// Returns the provider so the caller can flush it on shutdown. Without an
/// endpoint the global provider stays no-op; request handling is unaffected
/// since spans are a side channel only.
pub(crate) fn init_tracer_provider(config: &ServerConfig) -> Result<Option<TracerProvider>> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let Some(endpoint) = &config.otlp_endpoint else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            "otelbuild",
        )]))
        .build();

    global::set_tracer_provider(provider.clone());

    Ok(Some(provider))
}
