pub mod clock;
pub mod engine;
pub mod recorder;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::theories::TheoryFile;
use crate::error::ConfigError;
use crate::simulation::engine::{BatchOutcome, LtEngine};
use crate::simulation::recorder::{HistorySink, PublicationRecord};
use crate::theory::Strategy;

/// Starting conditions for one run, supplied by the caller.
#[derive(Debug, Clone)]
pub struct SimInput {
    pub theory: String,
    pub strategy: String,
    /// Log-space rho of the previous publication.
    pub rho: f64,
    pub sigma: u32,
    pub cap: Option<Cap>,
    pub recovery: Option<Recovery>,
}

/// Optional forced-publish cap on the primary currency.
#[derive(Debug, Clone, Copy)]
pub struct Cap {
    /// Log-space rho at which to force publication.
    pub value: f64,
    pub enabled: bool,
}

impl Cap {
    /// An enabled, positive cap publishes the run early; anything else is
    /// treated as uncapped.
    pub fn normalized(self) -> Option<f64> {
        (self.enabled && self.value > 0.0).then_some(self.value)
    }
}

/// Recovery descriptor carried over from a previous session. `value` seeds
/// recovery bookkeeping in the surrounding tooling; the engine itself only
/// reads `time` and `recovery_time` when it builds the publication record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery {
    pub value: f64,
    /// Sim time of the recovery point, in seconds.
    pub time: f64,
    pub recovery_time: bool,
}

/// Cooperative cancellation shared between a run and its host. Cheap to
/// clone; the engine polls it every tick.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a driven run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Published(PublicationRecord),
    /// The flag was cleared mid-run: no publication bookkeeping was done
    /// and the partial state must be discarded, not reported.
    Cancelled,
}

/// Build the engine for the requested theory. Each theory gets its own
/// engine type sharing the tick/purchase/publish shape; an id outside the
/// supported set is a configuration error.
pub fn engine_for(
    input: &SimInput,
    theories: &TheoryFile,
    dt: f64,
    ddt: f64,
    sink: HistorySink,
) -> Result<LtEngine, ConfigError> {
    match input.theory.as_str() {
        "LT-c4" => {
            let params = theories.get(&input.theory)?.clone();
            let strategy = Strategy::from_name(&input.theory, &input.strategy)?;
            LtEngine::new(params, input, strategy, dt, ddt, sink)
        }
        other => Err(ConfigError::UnknownTheory {
            name: other.to_string(),
        }),
    }
}

/// Drive an engine to publication or cancellation.
///
/// Runs `yield_every` ticks at a time, suspending between batches so that
/// interleaved runs and the host scheduler are never starved. State is
/// simply held across the suspension; nothing transactional happens at the
/// yield point.
pub async fn run_to_publication(
    mut engine: LtEngine,
    cancel: &CancelFlag,
    yield_every: u64,
) -> RunOutcome {
    loop {
        match engine.run_batch(yield_every, cancel) {
            BatchOutcome::Published => {
                return RunOutcome::Published(engine.publish());
            }
            BatchOutcome::Cancelled => {
                debug!(
                    ticks = engine.clock().ticks,
                    max_rho = engine.max_rho(),
                    "run cancelled before publication"
                );
                return RunOutcome::Cancelled;
            }
            BatchOutcome::Exhausted => {
                debug!(
                    ticks = engine.clock().ticks,
                    t = engine.clock().t,
                    max_rho = engine.max_rho(),
                    "yielding to scheduler"
                );
                tokio::task::yield_now().await;
            }
        }
    }
}
