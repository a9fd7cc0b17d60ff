//! Purchase logging and the cross-run history side channel.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::numeric::LogValue;
use crate::theory::CurrencySymbol;

/// One purchase, captured exactly as it happened. Nothing is recomputed
/// after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    pub variable: String,
    /// Level the purchase advanced the variable to.
    pub level: u32,
    /// Log-space cost paid.
    pub cost: LogValue,
    pub symbol: CurrencySymbol,
    /// Sim time of the purchase.
    pub timestamp: f64,
}

/// Append-only purchase log for a single run.
#[derive(Debug, Default)]
pub struct Recorder {
    purchases: Vec<PurchaseRecord>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    pub fn record(&mut self, purchase: PurchaseRecord) {
        self.purchases.push(purchase);
    }

    /// Drop trailing records stamped after the publish instant. The run can
    /// overshoot the exact publish time by up to one tick before the
    /// bookkeeping catches up.
    pub fn trim_after(&mut self, pub_t: f64) {
        while self.purchases.last().is_some_and(|p| p.timestamp > pub_t) {
            self.purchases.pop();
        }
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.purchases
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }
}

/// Raw publication outcome. Every field is a plain number; rendering into
/// scientific notation and time units is the CLI's job, not the engine's.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationRecord {
    pub theory: String,
    pub sigma: u32,
    /// Log-space rho of the previous publication.
    pub last_pub: LogValue,
    /// Log-space rho published by this run.
    pub pub_rho: LogValue,
    /// Tau gained: `(pub_rho - last_pub) * tau_factor`, log space.
    pub delta_tau: LogValue,
    /// Income multiplier implied by the new publication.
    pub pub_multi: f64,
    pub strategy: String,
    /// Best tau rate seen during the run, scaled by the tau factor.
    pub max_tau_per_hour: f64,
    /// Sim seconds since the recovery point.
    pub elapsed: f64,
    pub recovery_or_elapsed: f64,
    pub purchases: Vec<PurchaseRecord>,
}

/// A finished run's contribution to the shared history channel.
#[derive(Debug, Clone)]
pub struct RunHistory {
    pub theory: String,
    pub strategy: String,
    pub max_tau_per_hour: f64,
    pub purchases: Vec<PurchaseRecord>,
}

/// Producer handle for the shared history side channel.
///
/// Clones are cheap; every concurrently-running simulation appends through
/// its own handle, appends are never lost, and a single consumer drains in
/// completion order.
#[derive(Debug, Clone)]
pub struct HistorySink {
    tx: mpsc::UnboundedSender<RunHistory>,
}

impl HistorySink {
    pub fn push(&self, history: RunHistory) {
        // The send only fails once the consumer is gone, which a run ignores.
        let _ = self.tx.send(history);
    }
}

/// Create the shared history channel for a batch of runs.
pub fn history_channel() -> (HistorySink, mpsc::UnboundedReceiver<RunHistory>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (HistorySink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(variable: &str, timestamp: f64) -> PurchaseRecord {
        PurchaseRecord {
            variable: variable.to_string(),
            level: 1,
            cost: 1.0,
            symbol: CurrencySymbol::Rho,
            timestamp,
        }
    }

    #[test]
    fn records_append_in_order() {
        let mut recorder = Recorder::new();
        recorder.record(purchase("omega_t", 1.0));
        recorder.record(purchase("c", 2.0));
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.purchases()[0].variable, "omega_t");
        assert_eq!(recorder.purchases()[1].variable, "c");
    }

    #[test]
    fn trim_drops_only_trailing_overshoot() {
        let mut recorder = Recorder::new();
        recorder.record(purchase("omega_t", 1.0));
        recorder.record(purchase("omega_t", 5.0));
        recorder.record(purchase("c", 10.0));
        recorder.record(purchase("c", 11.0));
        recorder.trim_after(5.0);
        assert_eq!(recorder.len(), 2);
        assert!(recorder.purchases().iter().all(|p| p.timestamp <= 5.0));
    }

    #[test]
    fn trim_on_empty_log_is_a_noop() {
        let mut recorder = Recorder::new();
        recorder.trim_after(0.0);
        assert!(recorder.is_empty());
    }

    #[test]
    fn trim_keeps_records_exactly_at_publish_time() {
        let mut recorder = Recorder::new();
        recorder.record(purchase("omega_t", 5.0));
        recorder.trim_after(5.0);
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn sink_clones_share_one_channel() {
        let (sink, mut rx) = history_channel();
        let other = sink.clone();
        sink.push(RunHistory {
            theory: "LT-c4".to_string(),
            strategy: "LT-c4".to_string(),
            max_tau_per_hour: 1.0,
            purchases: vec![],
        });
        other.push(RunHistory {
            theory: "LT-c4".to_string(),
            strategy: "LT-c4".to_string(),
            max_tau_per_hour: 2.0,
            purchases: vec![],
        });
        assert_eq!(rx.try_recv().unwrap().max_tau_per_hour, 1.0);
        assert_eq!(rx.try_recv().unwrap().max_tau_per_hour, 2.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn push_without_consumer_does_not_panic() {
        let (sink, rx) = history_channel();
        drop(rx);
        sink.push(RunHistory {
            theory: "LT-c4".to_string(),
            strategy: "LT-c4".to_string(),
            max_tau_per_hour: 0.0,
            purchases: vec![],
        });
    }
}
