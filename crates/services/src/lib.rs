#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod runner;
pub mod sync;

pub use lesson_core::Clock;

pub use content::{ContentProvider, HttpContentProvider, StaticContentProvider};
pub use error::{ContentError, FlowError};
pub use runner::{
    AutoAdvance, CheckOutcome, EXPLAIN_AUTO_ADVANCE_DELAY, LessonFlowService, LessonRunner,
    NextOutcome, RunnerSnapshot, StepAdvance,
};
pub use sync::HttpProgressSync;
