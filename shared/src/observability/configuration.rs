use anyhow::{Context, Result};
use opentelemetry::{global, trace::TracerProvider};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter};
use opentelemetry_sdk::{
    logs::SdkLoggerProvider,
    metrics::SdkMeterProvider,
    propagation::TraceContextPropagator,
    trace::{RandomIdGenerator, SdkTracerProvider},
    Resource,
};
use tracing::Level;
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};
use tracing_subscriber::{prelude::*, EnvFilter};

const DEFAULT_SERVICE_NAME: &str = "send-order-notification";

// The builder's default detectors already cover the SDK, telemetry and
// OTEL_RESOURCE_ATTRIBUTES; only the service name is set explicitly.
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string()),
        )
        .build()
}

fn init_tracer_provider(resource: Resource) -> Result<SdkTracerProvider> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let exporter = SpanExporter::builder()
        .with_tonic()
        .build()
        .context("Failed to create span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_id_generator(RandomIdGenerator::default())
        .with_batch_exporter(exporter)
        .build())
}

fn init_meter_provider(resource: Resource) -> Result<SdkMeterProvider> {
    let exporter = MetricExporter::builder()
        .with_tonic()
        .build()
        .context("Failed to create metric exporter")?;

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_periodic_exporter(exporter)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(meter_provider)
}

fn init_logger_provider(resource: Resource) -> Result<SdkLoggerProvider> {
    let exporter = LogExporter::builder()
        .with_tonic()
        .build()
        .context("Failed to create log exporter")?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_simple_exporter(exporter)
        .build())
}

/// Installs the global `tracing` subscriber, bridging spans, events and
/// metrics to OTLP. Keep the returned guard alive for the process lifetime.
pub fn init_otel() -> Result<OtelGuard> {
    let resource = resource();
    let logger_provider = init_logger_provider(resource.clone())?;
    let tracer_provider = init_tracer_provider(resource.clone())?;
    let meter_provider = init_meter_provider(resource)?;

    let tracer = tracer_provider.tracer("send-order-notification");

    // exporter internals would otherwise log about their own exports
    let bridge_filter = EnvFilter::new("info")
        .add_directive("hyper=off".parse()?)
        .add_directive("opentelemetry=off".parse()?)
        .add_directive("tonic=off".parse()?)
        .add_directive("h2=off".parse()?)
        .add_directive("reqwest=off".parse()?);
    let log_bridge = OpenTelemetryTracingBridge::new(&logger_provider).with_filter(bridge_filter);

    tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            Level::INFO,
        ))
        .with(log_bridge)
        // stdout still reaches the function's log group without a collector
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(MetricsLayer::new(meter_provider.clone()))
        .with(OpenTelemetryLayer::new(tracer))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(OtelGuard {
        tracer_provider,
        meter_provider,
        logger_provider,
    })
}

pub struct OtelGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
}

impl OtelGuard {
    /// Exports everything buffered so far. Call at the end of every
    /// invocation, before the runtime freezes the process.
    pub fn flush(&self) {
        if let Err(err) = self.tracer_provider.force_flush() {
            eprintln!("Failed to flush traces: {err:?}");
        }
        if let Err(err) = self.meter_provider.force_flush() {
            eprintln!("Failed to flush metrics: {err:?}");
        }
        if let Err(err) = self.logger_provider.force_flush() {
            eprintln!("Failed to flush logs: {err:?}");
        }
    }
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(err) = self.tracer_provider.shutdown() {
            eprintln!("{err:?}");
        }
        if let Err(err) = self.meter_provider.shutdown() {
            eprintln!("{err:?}");
        }
        if let Err(err) = self.logger_provider.shutdown() {
            eprintln!("{err:?}");
        }
    }
}
