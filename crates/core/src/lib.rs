#![forbid(unsafe_code)]

pub mod aggregate;
pub mod model;
pub mod state;
pub mod time;
pub mod validator;

pub use aggregate::AggregateProgress;
pub use state::EngineState;
pub use time::Clock;
pub use validator::{MatchPolicy, TaskOutcome};
