//! C8 — Progress Reporter.
//!
//! Every report interval, if there's still work pending, logs `total`,
//! `added`, `missed`, the current queen and the top-3 requesters, then
//! resets the periodic counters. An idle tick logs a distinct message and
//! leaves the counters untouched, so the next busy tick still reports
//! whatever accumulated while idle. Cumulative `total_processed` is never
//! reset.

use backfill_types::PeerId;
use std::collections::HashMap;

/// Cumulative and periodic counters maintained by the request pipeline.
#[derive(Debug, Default)]
pub struct Counters {
    /// Cumulative count of nodes successfully written. Never reset.
    pub total_processed: u64,
    /// Nodes written since the last report.
    pub added: u64,
    /// Hashes that came back missing from a peer's response since the last
    /// report.
    pub missed: u64,
}

/// Logs the current progress and resets the periodic counters.
///
/// Mirrors `trinity`'s `backfill.py`, which logs a distinct idle message
/// when there is nothing left to walk rather than repeating the busy line
/// with zeroed counters.
pub fn report(
    counters: &mut Counters,
    requests_by_peer: &mut HashMap<PeerId, u64>,
    queen: Option<PeerId>,
    hash_stack_is_empty: bool,
) {
    if hash_stack_is_empty {
        tracing::info!(target: "backfill::reporter", "backfill idle: nothing left to walk");
    } else {
        let mut top: Vec<(&PeerId, &u64)> = requests_by_peer.iter().collect();
        top.sort_by(|a, b| b.1.cmp(a.1));
        let top3: Vec<String> =
            top.into_iter().take(3).map(|(peer, count)| format!("{peer}={count}")).collect();

        tracing::info!(
            target: "backfill::reporter",
            total = counters.total_processed,
            added = counters.added,
            missed = counters.missed,
            queen = ?queen,
            top_requesters = %top3.join(", "),
            "backfill progress",
        );

        counters.added = 0;
        counters.missed = 0;
        requests_by_peer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_resets_periodic_counters_but_not_total() {
        let mut counters = Counters { total_processed: 10, added: 5, missed: 2 };
        let mut requests = HashMap::new();
        requests.insert(PeerId::repeat_byte(1), 3u64);

        report(&mut counters, &mut requests, Some(PeerId::repeat_byte(1)), false);

        assert_eq!(counters.total_processed, 10);
        assert_eq!(counters.added, 0);
        assert_eq!(counters.missed, 0);
        assert!(requests.is_empty());
    }

    #[test]
    fn idle_report_leaves_periodic_counters_untouched() {
        let mut counters = Counters { total_processed: 10, added: 5, missed: 2 };
        let mut requests = HashMap::new();
        requests.insert(PeerId::repeat_byte(1), 3u64);

        report(&mut counters, &mut requests, Some(PeerId::repeat_byte(1)), true);

        assert_eq!(counters.total_processed, 10);
        assert_eq!(counters.added, 5);
        assert_eq!(counters.missed, 2);
        assert_eq!(requests.len(), 1);
    }
}
