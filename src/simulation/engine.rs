//! The LT-c4 theory engine.
//!
//! Two currencies (rho in the time domain, lambda in the laplace domain),
//! five variables, and a two-phase transform cycle. The engine owns every
//! piece of run state and advances strictly sequentially; correctness
//! depends on the fixed order of transform, production, and purchases
//! within a tick.

use tracing::trace;

use crate::config::theories::TheoryParams;
use crate::error::ConfigError;
use crate::numeric::{LogValue, l10, log_add, log_sub};
use crate::simulation::clock::SimulationClock;
use crate::simulation::recorder::{
    HistorySink, PublicationRecord, PurchaseRecord, Recorder, RunHistory,
};
use crate::simulation::{CancelFlag, Recovery, SimInput};
use crate::theory::{Phase, Strategy, Variable};

/// Currency channel indices.
const RHO: usize = 0;
const LAMBDA: usize = 1;

/// Variable indices the LT-c4 production formulas address.
const OMEGA_T: usize = 0;
const OMEGA_S: usize = 1;
const C: usize = 2;
const VARIABLE_COUNT: usize = 5;

/// Result of one [`LtEngine::run_batch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The publish condition holds; call [`LtEngine::publish`].
    Published,
    /// The cancellation flag was observed; the run is incomplete and must
    /// be discarded without publication bookkeeping.
    Cancelled,
    /// The tick budget ran out with the run still going.
    Exhausted,
}

/// Simulation engine for the LT-c4 theory.
#[derive(Debug)]
pub struct LtEngine {
    theory: String,
    params: TheoryParams,
    strategy: Strategy,
    clock: SimulationClock,
    currencies: [LogValue; 2],
    /// Running maximum of rho; publication decisions and reporting use
    /// this, decoupled from the oscillating instantaneous currency.
    max_rho: LogValue,
    /// Log-space accumulator of elapsed time-domain sim time; squared into
    /// the laplace production term, cleared on laplace exit.
    t_accum: LogValue,
    /// Phase-local accumulator from the theory definition; cleared on
    /// laplace exit and otherwise inert in this theory.
    q: LogValue,
    phase: Phase,
    transform_count: u32,
    variables: Vec<Variable>,
    recorder: Recorder,
    sink: HistorySink,
    last_pub: f64,
    sigma: u32,
    /// Normalized forced-publish cap on rho, if any.
    cap: Option<f64>,
    recovery: Recovery,
    tau_h: f64,
    max_tau_h: f64,
    pub_t: f64,
    pub_rho: f64,
}

impl LtEngine {
    pub fn new(
        params: TheoryParams,
        input: &SimInput,
        strategy: Strategy,
        dt: f64,
        ddt: f64,
        sink: HistorySink,
    ) -> Result<Self, ConfigError> {
        if params.variables.len() != VARIABLE_COUNT {
            return Err(ConfigError::Invalid {
                message: format!(
                    "theory '{}' needs exactly {VARIABLE_COUNT} variables, got {}",
                    input.theory,
                    params.variables.len()
                ),
            });
        }
        let variables = params.variables.iter().map(Variable::new).collect();
        Ok(LtEngine {
            theory: input.theory.clone(),
            strategy,
            clock: SimulationClock::new(dt, ddt),
            currencies: [0.0, 0.0],
            max_rho: 0.0,
            t_accum: 0.0,
            q: 0.0,
            phase: Phase::Laplace,
            transform_count: 0,
            variables,
            recorder: Recorder::new(),
            sink,
            last_pub: input.rho,
            sigma: input.sigma,
            cap: input.cap.and_then(|cap| cap.normalized()),
            recovery: input.recovery.unwrap_or_default(),
            tau_h: 0.0,
            max_tau_h: 0.0,
            pub_t: 0.0,
            pub_rho: 0.0,
            params,
        })
    }

    /// Advance one tick. Returns true once the publish condition holds.
    pub fn step(&mut self) -> bool {
        let cycle_cap = match self.phase {
            Phase::Time => self.params.time_cycle,
            Phase::Laplace => self.params.laplace_cycle,
        };
        if self.clock.timer >= cycle_cap {
            self.clock.timer = 0.0;
            self.transform();
        }
        self.produce();
        self.clock.advance();
        if self.currencies[RHO] > self.max_rho {
            self.max_rho = self.currencies[RHO];
        }
        self.update_tau_rate();
        self.buy_variables();
        self.publish_condition()
    }

    /// Run up to `max_ticks` ticks, polling the cancellation flag every
    /// tick. Returns early on publish or cancellation.
    pub fn run_batch(&mut self, max_ticks: u64, cancel: &CancelFlag) -> BatchOutcome {
        for _ in 0..max_ticks {
            if cancel.is_cancelled() {
                return BatchOutcome::Cancelled;
            }
            if self.step() {
                return BatchOutcome::Published;
            }
        }
        BatchOutcome::Exhausted
    }

    /// Fix the publication bookkeeping, trim the purchase history, and hand
    /// the run's purchases to the shared side channel.
    pub fn publish(&mut self) -> PublicationRecord {
        self.pub_t = self.clock.t;
        self.pub_rho = self.max_rho;
        self.recorder.trim_after(self.pub_t);

        let elapsed = (self.pub_t - self.recovery.time).max(0.0);
        let record = PublicationRecord {
            theory: self.theory.clone(),
            sigma: self.sigma,
            last_pub: self.last_pub,
            pub_rho: self.pub_rho,
            delta_tau: (self.pub_rho - self.last_pub) * self.params.tau_factor,
            pub_multi: 10f64.powf(self.params.tau_factor * (self.pub_rho - self.last_pub)),
            strategy: self.strategy.label().to_string(),
            max_tau_per_hour: self.max_tau_h * self.params.tau_factor,
            elapsed,
            recovery_or_elapsed: if self.recovery.recovery_time {
                self.recovery.time
            } else {
                elapsed
            },
            purchases: self.recorder.purchases().to_vec(),
        };
        self.sink.push(RunHistory {
            theory: record.theory.clone(),
            strategy: record.strategy.clone(),
            max_tau_per_hour: record.max_tau_per_hour,
            purchases: record.purchases.clone(),
        });
        trace!(
            pub_rho = self.pub_rho,
            pub_t = self.pub_t,
            ticks = self.clock.ticks,
            purchases = record.purchases.len(),
            "publication"
        );
        record
    }

    /// Exit the active phase: clear what is scoped to it, then flip.
    fn transform(&mut self) {
        if self.phase == Phase::Laplace {
            self.t_accum = 0.0;
            self.q = 0.0;
        }
        let exited = self.phase;
        for variable in &mut self.variables {
            if variable.reset_phase() == Some(exited) {
                variable.reset();
            }
        }
        self.phase = self.phase.toggled();
        self.transform_count += 1;
        trace!(
            phase = ?self.phase,
            count = self.transform_count,
            t = self.clock.t,
            "phase transform"
        );
    }

    /// Apply the active phase's production formula with the pre-advance dt.
    fn produce(&mut self) {
        let ldt = l10(self.clock.dt);
        let omega_t = self.variables[OMEGA_T].value();
        let omega_s = self.variables[OMEGA_S].value();
        match self.phase {
            Phase::Laplace => {
                let c = self.variables[C].value();
                let factor = l10((10f64.powf(c) - 1.0).powi(2));
                let lqs = factor + 2.0 * self.t_accum;
                self.currencies[LAMBDA] =
                    log_add(self.currencies[LAMBDA], omega_t + omega_s + lqs + ldt);
            }
            Phase::Time => {
                self.t_accum = log_add(self.t_accum, ldt);
                let damping = l10(std::f64::consts::PI) * self.q;
                self.currencies[RHO] =
                    log_add(self.currencies[RHO], omega_t + omega_s - damping + ldt);
            }
        }
    }

    /// Track the tau rate (rho gained over the previous publication per
    /// hour of sim time) and its running maximum.
    fn update_tau_rate(&mut self) {
        if self.clock.t > 0.0 {
            self.tau_h = (self.max_rho - self.last_pub) / (self.clock.t / 3600.0);
            if self.tau_h > self.max_tau_h {
                self.max_tau_h = self.tau_h;
            }
        }
    }

    /// Attempt purchases in fixed priority order: highest index first, each
    /// variable bought repeatedly until a check fails, then the next lower
    /// one. A variable running dry never blocks the ones after it.
    fn buy_variables(&mut self) {
        for i in (0..self.variables.len()).rev() {
            loop {
                let cost = self.variables[i].cost();
                let channel = self.variables[i].currency().channel();
                let affordable = self.currencies[channel] > cost;
                if !(affordable
                    && self.strategy.permits(i)
                    && self.variables[i].unlock() == self.phase)
                {
                    break;
                }
                self.currencies[channel] = log_sub(self.currencies[channel], cost);
                debug_assert!(
                    !self.currencies[channel].is_nan(),
                    "debit exceeded balance for '{}'",
                    self.variables[i].name()
                );
                if self.max_rho + self.params.history_margin > self.last_pub {
                    self.recorder.record(PurchaseRecord {
                        variable: self.variables[i].name().to_string(),
                        level: self.variables[i].level() + 1,
                        cost,
                        symbol: self.variables[i].currency(),
                        timestamp: self.clock.t,
                    });
                }
                self.variables[i].buy();
            }
        }
    }

    fn publish_condition(&self) -> bool {
        self.max_rho >= self.params.publish_rho
            || self.cap.is_some_and(|cap| self.max_rho >= cap)
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transform_count(&self) -> u32 {
        self.transform_count
    }

    pub fn max_rho(&self) -> LogValue {
        self.max_rho
    }

    pub fn currencies(&self) -> &[LogValue; 2] {
        &self.currencies
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        self.recorder.purchases()
    }
}
