use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and describe the citation metrics.
    pub fn init(store_capacity: usize) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!(
            "citations_numbers_total",
            "Numbers tokenized out of final outputs."
        );
        describe_counter!(
            "citations_matched_total",
            "Numbers that matched a tool payload and were persisted."
        );
        describe_counter!(
            "citations_skipped_total",
            "Numbers with no matching tool payload."
        );
        describe_counter!(
            "citations_store_errors_total",
            "Citations dropped because the store rejected the write."
        );
        describe_histogram!(
            "citations_extract_ms",
            "Wall time of one extraction run in milliseconds."
        );
        describe_gauge!(
            "citations_last_extract_ts",
            "Unix timestamp of the most recent extraction run."
        );

        // Static gauge with the configured store bound.
        gauge!("citations_store_capacity").set(store_capacity as f64);

        Self { handle }
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
