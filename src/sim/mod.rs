mod runner;
pub mod world_events;

pub use runner::{RunSummary, SimConfig, TurnOutcome, TurnReport, process_turn, run, run_with_rng};
pub use world_events::{eligible_events, roll_world_event};
