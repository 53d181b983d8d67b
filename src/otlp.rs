use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use opentelemetry_semantic_conventions::attribute::DEPLOYMENT_ENVIRONMENT_NAME;
use tracing::Level;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::Result;

fn span_exporter(endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_attribute(KeyValue::new(
            DEPLOYMENT_ENVIRONMENT_NAME,
            std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "dev".to_string()),
        ))
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Installs the global subscriber: fmt output, sentry breadcrumbs and, when an
/// endpoint is given, OTLP export. Keep the guard alive until shutdown.
pub fn init_tracing_subscriber(endpoint: Option<String>) -> Result<OtelGuard> {
    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(Level::INFO))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer());

    let Some(endpoint) = endpoint else {
        subscriber.init();
        tracing::warn!("No OTLP_ENDPOINT specified, not enabling opentelemetry");
        return Ok(OtelGuard { provider: None });
    };

    let provider = span_exporter(&endpoint)?;
    subscriber
        .with(OpenTelemetryLayer::new(provider.tracer(env!("CARGO_PKG_NAME"))))
        .init();

    Ok(OtelGuard {
        provider: Some(provider),
    })
}

/// Flushes pending spans when dropped.
pub struct OtelGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            let _ = provider.shutdown();
        }
    }
}
