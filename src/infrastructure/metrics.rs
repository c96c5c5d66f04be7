//! Ambient pipeline/retrieval instrumentation via the `metrics` crate.
//!
//! No HTTP exporter is started here — exposing `/metrics` over the network
//! is a transport concern and stays out of scope (spec.md's non-goals on
//! transport). [`install`] wires a `metrics-exporter-prometheus` recorder
//! so counters/histograms recorded through this module are aggregated
//! in-process; [`render`] lets a caller (e.g. a CLI `--metrics` flag, or a
//! host process that does own an HTTP surface) pull the current snapshot
//! as Prometheus text exposition format on demand.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Installs the process-wide Prometheus recorder. Call once at startup;
/// subsequent calls are a no-op error that's safe to ignore (a second
/// folder added to an already-running process doesn't need its own
/// recorder).
pub fn install() -> Option<PrometheusHandle> {
    PrometheusBuilder::new().install_recorder().ok()
}

/// Render the current metrics snapshot as Prometheus text exposition
/// format, for a caller that owns its own transport.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// A document finished the pipeline with `status` (`"ok"`, `"failed_quality"`,
/// `"failed"`, or `"skipped"`) for `folder`.
pub fn record_document_indexed(folder: &str, status: &str) {
    metrics::counter!("folder_index_documents_total", "folder" => folder.to_string(), "status" => status.to_string())
        .increment(1);
}

/// A pipeline stage failed for `folder` at `scope` (parse/embedding/etc).
pub fn record_stage_failure(folder: &str, scope: &str) {
    metrics::counter!("folder_index_failures_total", "folder" => folder.to_string(), "scope" => scope.to_string())
        .increment(1);
}

/// A `search` call against `folder` took `elapsed`.
pub fn record_search_latency(folder: &str, elapsed: Duration) {
    metrics::histogram!("folder_search_latency_ms", "folder" => folder.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// A full reindex pass against `folder` took `elapsed`.
pub fn record_reindex_duration(folder: &str, elapsed: Duration) {
    metrics::histogram!("folder_reindex_duration_ms", "folder" => folder.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_an_installed_recorder_does_not_panic() {
        record_document_indexed("docs", "ok");
        record_stage_failure("docs", "parse");
        record_search_latency("docs", Duration::from_millis(12));
        record_reindex_duration("docs", Duration::from_secs(1));
    }
}
