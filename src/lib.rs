//! A tick-driven publication simulator for incremental-game theories.
//!
//! A theory pairs production formulas with purchasable upgrade variables,
//! alternating production phases, and a purchasing strategy. The engine
//! advances a theory tick by tick, buys upgrades as the strategy and
//! milestone gates allow, and stops when the publish condition is reached.
//! Currency magnitudes span hundreds of orders of magnitude over a run, so
//! all quantities live in base-10 log space (see [`numeric`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod numeric;
pub mod simulation;
pub mod theory;
