use std::io;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing::{info, warn, Subscriber};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Where spans are exported when OTLP tracing is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtlpSettings {
    pub service_name: String,
    pub endpoint: String,
}

impl OtlpSettings {
    /// Enabled only when both `SERVICE_NAME` and `OTEL_EXPORTER_OTLP_ENDPOINT`
    /// are non-empty. An endpoint without a scheme is taken as plain `http://`.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup("SERVICE_NAME").filter(|v| !v.trim().is_empty())?;
        let endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty())?;
        let endpoint = if endpoint.contains("://") { endpoint } else { format!("http://{endpoint}") };
        Some(Self { service_name: service_name.trim().to_string(), endpoint })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

type OtlpLayer<S> = OpenTelemetryLayer<S, sdktrace::Tracer>;

/// Build the OTLP export layer when configured. The error side explains why a
/// requested export was not installed and is logged once the subscriber is up.
///
/// The batch exporter runs on Tokio, so without a runtime in context the
/// layer is skipped.
fn otlp_layer<S>() -> Result<Option<OtlpLayer<S>>, String>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let Some(settings) = OtlpSettings::from_env() else { return Ok(None) };
    if tokio::runtime::Handle::try_current().is_err() {
        return Err("no Tokio runtime is active".into());
    }
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(settings.endpoint.clone()))
        .with_trace_config(
            sdktrace::config()
                .with_sampler(sdktrace::Sampler::AlwaysOn)
                .with_resource(Resource::new(vec![KeyValue::new("service.name", settings.service_name)])),
        )
        .install_batch(runtime::Tokio)
        .map_err(|e| format!("{}: {e}", settings.endpoint))?;
    Ok(Some(tracing_opentelemetry::layer().with_tracer(tracer)))
}

fn report_otlp(enabled: bool, problem: Option<String>) {
    if let Some(e) = problem {
        warn!(event = "otlp_disabled", error = %e, "OTLP export requested but not installed");
    } else if enabled {
        info!(event = "otlp_enabled", "exporting spans over OTLP");
    }
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout so container runtimes pick it up
/// - Exports spans over OTLP when `SERVICE_NAME` and `OTEL_EXPORTER_OTLP_ENDPOINT` are set
pub fn init_logging_default() {
    let (otlp, problem) = match otlp_layer() {
        Ok(layer) => (layer, None),
        Err(e) => (None, Some(e)),
    };
    let enabled = otlp.is_some();
    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(otlp)
        .with(fmt::layer().with_target(false).compact().with_writer(io::stdout))
        .try_init();
    if installed.is_ok() {
        report_otlp(enabled, problem);
    }
}

/// Initialize tracing subscriber with JSON structured output.
/// Same filter and OTLP behaviour as [`init_logging_default`].
pub fn init_logging_json() {
    let (otlp, problem) = match otlp_layer() {
        Ok(layer) => (layer, None),
        Err(e) => (None, Some(e)),
    };
    let enabled = otlp.is_some();
    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(otlp)
        .with(fmt::layer().with_target(true).json().with_writer(io::stdout))
        .try_init();
    if installed.is_ok() {
        report_otlp(enabled, problem);
    }
}

/// Pick the output format from `LOG_FORMAT` (`json` or anything else for text).
pub fn init_logging_from_env() {
    match std::env::var("LOG_FORMAT") {
        Ok(v) if v.eq_ignore_ascii_case("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

/// Flush buffered spans and stop the OTLP exporter. No-op when export is off.
/// Call from outside async code while the runtime is still alive.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
