use std::time::Duration;

/// Tunable constants for the backfill engine.
///
/// Mirrors the handful of knobs a single `reth` sync stage exposes (compare
/// `reth_network::NetworkConfig`): plain data, no env or file parsing here —
/// that belongs to whoever embeds the engine.
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Hashes requested per batch. The walker keeps expanding until the tail
    /// of the hash stack holds at least this many confirmed-missing entries.
    pub request_size: usize,
    /// Cool-down applied to a peer after a successful or failed-but-clean
    /// response, before it becomes eligible for another background request.
    pub gap_between_tests: Duration,
    /// Cool-down applied to the queen after an external `penalize_queen` call
    /// demotes it back into the waiting set.
    pub non_ideal_response_penalty: Duration,
    /// How often the progress reporter logs and resets its periodic counters.
    pub report_interval: Duration,
    /// Delay before re-offering a peer that was popped while already
    /// mid-request (the reentrancy guard).
    pub reentrancy_retry_delay: Duration,
    /// Delay before re-offering a peer popped when the walker had nothing
    /// ready to request.
    pub idle_retry_delay: Duration,
    /// Backlog capacity for the peer join/leave event channel.
    pub peer_event_backlog: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            request_size: 16,
            gap_between_tests: Duration::from_secs(3),
            non_ideal_response_penalty: Duration::from_secs(60),
            report_interval: Duration::from_secs(10),
            reentrancy_retry_delay: Duration::from_secs(10),
            idle_retry_delay: Duration::from_secs(2),
            peer_event_backlog: 2000,
        }
    }
}
