//! Counters and gauges exported via the `metrics` facade, in the style of
//! `reth`'s per-subsystem `Metrics` structs (hand-rolled here rather than via
//! `reth-metrics-derive`, whose source wasn't part of the retrieved pack —
//! see DESIGN.md).

#[derive(Debug, Default, Clone, Copy)]
pub struct BackfillMetrics;

impl BackfillMetrics {
    pub fn node_added(&self) {
        metrics::counter!("backfill.nodes_added").increment(1);
    }

    pub fn node_missed(&self) {
        metrics::counter!("backfill.nodes_missed").increment(1);
    }

    pub fn request_timeout(&self) {
        metrics::counter!("backfill.request_timeouts").increment(1);
    }

    pub fn request_error(&self) {
        metrics::counter!("backfill.request_errors").increment(1);
    }

    pub fn queen_switch(&self) {
        metrics::counter!("backfill.queen_switches").increment(1);
    }

    pub fn hash_stack_depth(&self, depth: usize) {
        metrics::gauge!("backfill.hash_stack_depth").set(depth as f64);
    }

    pub fn waiting_peers(&self, count: usize) {
        metrics::gauge!("backfill.waiting_peers").set(count as f64);
    }
}
