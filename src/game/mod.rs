mod gesture;
mod grid;
mod session;
mod stats;

pub(crate) use grid::Direction;
pub(crate) use session::{RunnerConfig, RunnerPhase, RunnerSession, TickEvent};
pub(crate) use stats::{finalize, RunnerStats};
