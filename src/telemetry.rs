//! Logging and trace export setup
//!
//! Logs go to stderr so they never mix with rendered output on stdout.
//! When an OTLP endpoint is configured, spans and log events are exported
//! as well.

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, TelemetryConfig};

const SERVICE_NAME: &str = "symptocare";

/// Flushes exporters on drop. Keep it alive for the life of the process.
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush trace exporter: {e}");
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush log exporter: {e}");
            }
        }
    }
}

/// Filter directives: `--verbose` wins, then `RUST_LOG`, then the config
fn build_filter(logging: &LoggingConfig, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(format!("warn,{SERVICE_NAME}=debug"));
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{SERVICE_NAME}={}", logging.level)))
}

fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new(SERVICE_VERSION, crate::VERSION))
        .build()
}

/// Install the global subscriber
pub fn init(
    logging: &LoggingConfig,
    telemetry: &TelemetryConfig,
    verbose: bool,
) -> Result<TelemetryGuard> {
    let filter = build_filter(logging, verbose);

    let json = logging.format == "json";
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

    let mut guard = TelemetryGuard::default();
    let mut trace_layer = None;
    let mut log_layer = None;

    if let Some(endpoint) = &telemetry.otlp_endpoint {
        let endpoint = endpoint.trim_end_matches('/');

        let span_exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(format!("{endpoint}/v1/traces"))
            .build()
            .with_context(|| "Failed to create OTLP span exporter")?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource())
            .build();
        trace_layer =
            Some(tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(SERVICE_NAME)));

        let log_exporter = LogExporter::builder()
            .with_http()
            .with_endpoint(format!("{endpoint}/v1/logs"))
            .build()
            .with_context(|| "Failed to create OTLP log exporter")?;
        let logger_provider = SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource())
            .build();
        log_layer = Some(OpenTelemetryTracingBridge::new(&logger_provider));

        guard.tracer_provider = Some(tracer_provider);
        guard.logger_provider = Some(logger_provider);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(trace_layer)
        .with(log_layer)
        .try_init()
        .with_context(|| "Failed to install tracing subscriber")?;

    if let Some(endpoint) = &telemetry.otlp_endpoint {
        tracing::info!("Exporting traces and logs to {endpoint}");
    }

    Ok(guard)
}
