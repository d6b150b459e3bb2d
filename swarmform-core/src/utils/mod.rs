//! Batch harness around the swarm engine.

pub mod batch;

pub use batch::{run_once, run_to_completion, BatchRunner, BatchSummary, RunOutcome, RunRecord};
