use opentelemetry::{global, trace::TracerProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_subscriber::{
    EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::otel::{self, Providers, SERVICE_NAME};

/// Installs the global subscriber. With `export` set, spans and metrics also
/// go to the OTLP collector and the returned providers must be shut down on exit.
pub fn init_telemetry(export: bool) -> anyhow::Result<Option<Providers>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE);

    if !export {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
        return Ok(None);
    }

    let providers = otel::init_providers()?;
    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(providers.tracer.clone());
    global::set_meter_provider(providers.meter.clone());

    let tracer = providers.tracer.tracer(SERVICE_NAME);
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    Ok(Some(providers))
}
