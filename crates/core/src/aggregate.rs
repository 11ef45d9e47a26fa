//! Cross-lesson progress, independent of any single runner.

use std::collections::HashSet;

use crate::model::{LessonId, StepId};

/// Progress accumulated across lessons for one user session.
///
/// Longer-lived than a lesson runner: the host keeps one of these for the
/// whole process (behind a mutex when shared across threads) and updates
/// it as runners report task completion.
#[derive(Debug, Clone, Default)]
pub struct AggregateProgress {
    completed_steps: HashSet<StepId>,
    current_lesson_id: Option<LessonId>,
    last_step_reached: Option<StepId>,
    total_steps_attempted: u32,
    total_steps_completed: u32,
}

impl AggregateProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task submission, successful or not.
    pub fn record_attempt(&mut self) {
        self.total_steps_attempted = self.total_steps_attempted.saturating_add(1);
    }

    /// Mark a step as completed.
    ///
    /// Idempotent: the set membership and the completed counter both move
    /// only on the first completion of a given id. Returns true when the
    /// step was newly completed.
    pub fn complete_step(&mut self, step_id: StepId) -> bool {
        let newly = self.completed_steps.insert(step_id);
        if newly {
            self.total_steps_completed = self.total_steps_completed.saturating_add(1);
        }
        newly
    }

    #[must_use]
    pub fn is_step_completed(&self, step_id: &StepId) -> bool {
        self.completed_steps.contains(step_id)
    }

    pub fn set_current_lesson(&mut self, lesson_id: LessonId) {
        self.current_lesson_id = Some(lesson_id);
    }

    pub fn mark_step_reached(&mut self, step_id: StepId) {
        self.last_step_reached = Some(step_id);
    }

    #[must_use]
    pub fn current_lesson_id(&self) -> Option<&LessonId> {
        self.current_lesson_id.as_ref()
    }

    #[must_use]
    pub fn last_step_reached(&self) -> Option<&StepId> {
        self.last_step_reached.as_ref()
    }

    #[must_use]
    pub fn total_steps_attempted(&self) -> u32 {
        self.total_steps_attempted
    }

    #[must_use]
    pub fn total_steps_completed(&self) -> u32 {
        self.total_steps_completed
    }

    /// Clear completion state for a lesson, but only if it is the current
    /// one. A guarded, not unconditional, reset.
    pub fn reset_lesson_progress(&mut self, lesson_id: &LessonId) {
        if self.current_lesson_id.as_ref() == Some(lesson_id) {
            self.completed_steps.clear();
            self.total_steps_attempted = 0;
        }
    }

    /// Completed/attempted as a percentage; 0 when nothing was attempted.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        if self.total_steps_attempted == 0 {
            return 0.0;
        }
        f64::from(self.total_steps_completed) / f64::from(self.total_steps_attempted) * 100.0
    }
}
