//! Magnate engine library.
//!
//! An event-sourced simulation engine for a property-trading board game.
//! Exposes the board topology, entity stores, economic calculators, the
//! event bus, and the turn orchestrator for use by integration tests and
//! the binary entry point.

pub mod batch;
pub mod board;
pub mod decision;
pub mod economy;
pub mod events;
pub mod journal;
pub mod orchestrator;
pub mod state;
