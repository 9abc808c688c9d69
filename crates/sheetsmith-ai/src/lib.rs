//! Fills a session's grid from a natural-language prompt.
//!
//! The prompt goes to a remote cell map backend; the returned map of backend
//! references to values is decoded and written into the grid in one batch.

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod plan;

pub use client::{CellMap, CellMapClient, FillRequest};
pub use error::{FillError, GENERIC_FAILURE};
pub use orchestrator::{FillOrchestrator, FillReport, DEFAULT_SETTLE};
pub use plan::FillPlan;
