mod engine;
mod snapshot;
mod workflow;

// Public API of the lesson progression subsystem.
pub use engine::{
    AutoAdvance, CheckOutcome, EXPLAIN_AUTO_ADVANCE_DELAY, LessonRunner, NextOutcome, StepAdvance,
};
pub use snapshot::RunnerSnapshot;
pub use workflow::LessonFlowService;
