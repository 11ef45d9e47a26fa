mod ids;
mod lesson;
mod progress;

pub use ids::{LessonId, ParseIdError, StepId, UserId};
pub use lesson::{
    CodeLanguage, Lesson, LessonDoc, LessonError, Step, StepDoc, Supplemental, SupplementalKind,
    Task, Visual, VisualKind,
};
pub use progress::ProgressRecord;
