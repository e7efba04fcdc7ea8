use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_ingest_metrics();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time registration so series show up on /metrics.
pub fn describe_ingest_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_fetched_total", "Raw articles returned by the feed.");
        describe_counter!("ingest_accepted_total", "Articles scored and appended to the corpus.");
        describe_counter!(
            "ingest_duplicates_total",
            "Articles rejected as already seen (history or batch)."
        );
        describe_counter!("ingest_malformed_total", "Articles missing required fields.");
        describe_counter!(
            "ingest_inference_failures_total",
            "Articles skipped because a classifier failed."
        );
        describe_counter!(
            "ingest_deferred_total",
            "New articles left for a later cycle by the batch cap."
        );
        describe_counter!("ingest_cycle_errors_total", "Aborted ingestion cycles.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when the ingestion cycle last ran.");
    });
}
