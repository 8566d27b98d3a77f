//! Log and trace setup shared by every binary of the workspace.
//!
//! Logs always go to stdout through `tracing-subscriber`'s fmt layer, filtered
//! by `RUST_LOG`. When a collection endpoint is configured, spans are also
//! exported over OTLP.

use anyhow::{bail, Context};
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::Config, Resource};
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

const DEFAULT_LOG_FILTER: &str = "info";

pub struct Telemetery {
    service_name: String,
    collection_endpoint: Option<Url>,
    otlp_enabled: bool,
}

impl Telemetery {
    pub fn new(service_name: String, collection_endpoint: Option<Url>) -> anyhow::Result<Self> {
        if service_name.trim().is_empty() {
            bail!("Telemetry service name must not be empty");
        }
        Ok(Self {
            service_name,
            collection_endpoint,
            otlp_enabled: false,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Install the global subscriber. Must run inside a tokio runtime when an
    /// OTLP endpoint is set.
    pub fn setup(&mut self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
            .context("Invalid log filter")?;
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

        let otel_layer = match &self.collection_endpoint {
            Some(endpoint) => {
                let provider = opentelemetry_otlp::new_pipeline()
                    .tracing()
                    .with_exporter(
                        opentelemetry_otlp::new_exporter()
                            .tonic()
                            .with_endpoint(endpoint.as_str()),
                    )
                    .with_trace_config(Config::default().with_resource(Resource::new(vec![
                        KeyValue::new(SERVICE_NAME, self.service_name.clone()),
                    ])))
                    .install_batch(runtime::Tokio)
                    .context("Failed to install the OTLP trace pipeline")?;
                let tracer = provider.tracer(self.service_name.clone());
                opentelemetry::global::set_tracer_provider(provider);
                self.otlp_enabled = true;
                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()
            .context("A global tracing subscriber is already installed")?;

        debug!(
            service = %self.service_name,
            otlp = self.otlp_enabled,
            "Telemetry initialised"
        );
        Ok(())
    }

    /// Flush pending spans. Safe to call when OTLP export is off.
    pub fn shutdown(&self) {
        if self.otlp_enabled {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_service_name() {
        assert!(Telemetery::new("  ".to_string(), None).is_err());
    }

    #[tokio::test]
    async fn test_setup_installs_subscriber_once() {
        let mut telemetery = Telemetery::new("rwa_engine".to_string(), None).unwrap();
        assert_eq!(telemetery.service_name(), "rwa_engine");

        telemetery.setup().unwrap();
        assert!(telemetery.setup().is_err());
        telemetery.shutdown();
    }
}
