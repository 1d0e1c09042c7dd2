use cloudevents::Event;
use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Links `span` to the producer's trace when the CloudEvent carries a
/// W3C `traceparent` extension.
pub fn add_span_link_from(span: &tracing::Span, cloud_event: &Event) {
    let Some(trace_parent) = cloud_event.extension("traceparent") else {
        tracing::debug!("No traceparent found in CloudEvent");
        return;
    };
    let trace_parent = trace_parent.to_string();

    match extract_span_context_from(&trace_parent) {
        Some(remote_span_context) => span.add_link(remote_span_context),
        None => tracing::warn!(
            "Failed to extract span context from traceparent: {}",
            trace_parent
        ),
    }
}

/// Parses `00-{trace_id}-{span_id}-{flags}`.
pub fn extract_span_context_from(trace_parent: &str) -> Option<SpanContext> {
    let parts: Vec<&str> = trace_parent.split('-').collect();
    if parts.len() < 4 {
        return None;
    }

    let trace_id = TraceId::from_hex(parts[1]).ok()?;
    let span_id = SpanId::from_hex(parts[2]).ok()?;
    let flags = u8::from_str_radix(parts[3], 16)
        .map(TraceFlags::new)
        .unwrap_or(TraceFlags::SAMPLED);

    Some(SpanContext::new(
        trace_id,
        span_id,
        flags,
        true,
        TraceState::NONE,
    ))
}
