//! Execution: node executors, edge condition evaluation, and the run loop.

pub mod evaluator;
mod executor;
pub mod executors;
mod flow_engine;

pub use executor::{NodeExecutor, NodeResult};
pub use flow_engine::{FlowEngine, RunState};
