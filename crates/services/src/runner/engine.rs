use std::fmt;
use std::time::Duration;

use lesson_core::EngineState;
use lesson_core::model::{Lesson, ProgressRecord, Step};
use lesson_core::validator::{self, MatchPolicy};

use super::snapshot::RunnerSnapshot;

/// Delay before an untouched `Explain` phase advances to `Animate`.
pub const EXPLAIN_AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Directive to schedule a one-shot timed transition.
///
/// The runner hands this to its host instead of owning a timer. When the
/// delay elapses the host calls [`LessonRunner::fire_auto_advance`] with
/// the captured generation; a stale generation makes the callback a
/// no-op, so no timer handle ever needs cancelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvance {
    pub generation: u64,
    pub delay: Duration,
}

/// Result of a step-level advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAdvance {
    /// A new step was entered. The host persists the position and
    /// schedules the auto-advance.
    Entered { step_index: usize, auto: AutoAdvance },
    /// The last step was passed; the lesson is complete. No further
    /// persistence write happens beyond the one already made for
    /// reaching that step.
    Completed,
}

/// Result of a single `next()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Advanced one phase within the current step.
    Phase(EngineState),
    /// Delegated to a step-level advance.
    Step(StepAdvance),
    /// No lesson is installed; nothing happened.
    Idle,
}

/// Result of a task check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The current step has no task; nothing was validated.
    NoTask,
    /// The submission satisfied the task. The host persists progress.
    Completed,
    /// The submission did not match; `fail_message` is set.
    Failed,
    /// No lesson is installed; nothing happened.
    Idle,
}

/// The lesson progression engine: a synchronous state machine over the
/// phases of the current step.
///
/// Owns all session state exclusively. Effects — persistence and timers —
/// are returned as values for the caller to execute, which keeps every
/// transition synchronous and atomic with respect to the others. The
/// single concurrency hazard, the auto-advance timer, is defused by the
/// generation token rather than by cancellation.
pub struct LessonRunner {
    lesson: Option<Lesson>,
    step_index: usize,
    state: EngineState,
    user_code: String,
    task_completed: bool,
    task_failed: bool,
    fail_message: String,
    generation: u64,
    revision: u64,
    match_policy: MatchPolicy,
}

impl LessonRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lesson: None,
            step_index: 0,
            state: EngineState::Init,
            user_code: String::new(),
            task_completed: false,
            task_failed: false,
            fail_message: String::new(),
            generation: 0,
            revision: 0,
            match_policy: MatchPolicy::default(),
        }
    }

    /// Select how task submissions are matched against expected patterns.
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.lesson.as_ref().and_then(|l| l.step(self.step_index))
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.lesson
            .as_ref()
            .is_some_and(|l| self.step_index + 1 >= l.len())
    }

    #[must_use]
    pub fn user_code(&self) -> &str {
        &self.user_code
    }

    #[must_use]
    pub fn task_completed(&self) -> bool {
        self.task_completed
    }

    #[must_use]
    pub fn task_failed(&self) -> bool {
        self.task_failed
    }

    #[must_use]
    pub fn fail_message(&self) -> &str {
        &self.fail_message
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn match_policy(&self) -> MatchPolicy {
        self.match_policy
    }

    #[must_use]
    pub fn snapshot(&self) -> RunnerSnapshot {
        RunnerSnapshot {
            state: self.state,
            step_index: self.step_index,
            total_steps: self.lesson.as_ref().map_or(0, Lesson::len),
            is_last_step: self.is_last_step(),
            task_completed: self.task_completed,
            task_failed: self.task_failed,
            fail_message: self.fail_message.clone(),
            user_code: self.user_code.clone(),
            revision: self.revision,
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Drop any installed lesson and return to `Init`.
    ///
    /// Called at the start of a load so that a fetch failure leaves the
    /// runner in a non-started state rather than on the previous lesson.
    pub fn reset(&mut self) {
        self.lesson = None;
        self.step_index = 0;
        self.state = EngineState::Init;
        self.user_code.clear();
        self.task_completed = false;
        self.task_failed = false;
        self.fail_message.clear();
        self.generation += 1;
        self.revision += 1;
    }

    /// Install a loaded lesson and enter its first (or resumed) step.
    ///
    /// The resume record is honored only when its lesson id matches and
    /// its index is in bounds; otherwise the lesson starts at step 0.
    /// Called by the flow service after the content provider succeeds; a
    /// failed load never reaches this point, so the runner stays
    /// unstarted on load errors.
    pub fn install_lesson(
        &mut self,
        lesson: Lesson,
        resume: Option<&ProgressRecord>,
    ) -> AutoAdvance {
        let index = resume
            .filter(|r| r.lesson_id == *lesson.id() && r.step_index < lesson.len())
            .map_or(0, |r| r.step_index);

        self.lesson = Some(lesson);
        self.step_index = index;
        self.start_step()
    }

    /// Enter the step at `self.step_index`: reset task state, seed the
    /// code buffer, show the explanation, and hand back the auto-advance
    /// directive for the new generation.
    fn start_step(&mut self) -> AutoAdvance {
        self.task_completed = false;
        self.task_failed = false;
        self.fail_message.clear();
        self.user_code = self
            .current_step()
            .and_then(Step::task)
            .and_then(|t| t.starter_code.clone())
            .unwrap_or_default();

        self.state = EngineState::Explain;
        self.generation += 1;
        self.revision += 1;

        tracing::debug!(step_index = self.step_index, "entered step");

        AutoAdvance {
            generation: self.generation,
            delay: EXPLAIN_AUTO_ADVANCE_DELAY,
        }
    }

    /// Apply the timed `Explain -> Animate` transition, if still fresh.
    ///
    /// Returns true when the transition was applied. A generation other
    /// than the current one, or a state already past `Explain`, means the
    /// scheduled callback is stale and nothing changes.
    pub fn fire_auto_advance(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != EngineState::Explain {
            return false;
        }
        self.state = EngineState::Animate;
        self.revision += 1;
        true
    }

    /// Advance exactly one phase within the current step; in
    /// `WaitForUser` or `Complete` this delegates to [`Self::next_step`].
    pub fn next(&mut self) -> NextOutcome {
        match self.state {
            EngineState::Init => NextOutcome::Idle,
            EngineState::Explain => {
                self.state = EngineState::Animate;
                self.revision += 1;
                NextOutcome::Phase(self.state)
            }
            EngineState::Animate => {
                self.state = EngineState::ShowCode;
                self.revision += 1;
                NextOutcome::Phase(self.state)
            }
            EngineState::ShowCode => {
                self.state = EngineState::WaitForUser;
                self.revision += 1;
                NextOutcome::Phase(self.state)
            }
            EngineState::WaitForUser | EngineState::Complete => match self.next_step() {
                Some(advance) => NextOutcome::Step(advance),
                None => NextOutcome::Idle,
            },
        }
    }

    /// Move to the next step, or to `Complete` on the last one.
    ///
    /// Returns `None` when no lesson is installed.
    pub fn next_step(&mut self) -> Option<StepAdvance> {
        self.lesson.as_ref()?;

        if self.is_last_step() {
            self.state = EngineState::Complete;
            self.revision += 1;
            return Some(StepAdvance::Completed);
        }

        self.step_index += 1;
        let auto = self.start_step();
        Some(StepAdvance::Entered {
            step_index: self.step_index,
            auto,
        })
    }

    /// Move back one step. No-op at index 0 and while no lesson is
    /// installed; moving backward is not forward progress, so the caller
    /// gets no persistence signal.
    pub fn previous_step(&mut self) -> Option<AutoAdvance> {
        self.lesson.as_ref()?;
        if self.step_index == 0 {
            return None;
        }
        self.step_index -= 1;
        Some(self.start_step())
    }

    /// Validate a submission against the current step's task.
    ///
    /// Stores the submission in the code buffer either way. Idempotent:
    /// checking the same code twice produces the same outcome and flags.
    pub fn check_task(&mut self, code: &str) -> CheckOutcome {
        if self.lesson.is_none() {
            return CheckOutcome::Idle;
        }

        self.user_code = code.to_string();
        self.revision += 1;

        let Some(task) = self.current_step().and_then(Step::task).cloned() else {
            return CheckOutcome::NoTask;
        };

        self.task_completed = false;
        self.task_failed = false;
        self.fail_message.clear();

        let outcome = validator::validate(&task, code, self.match_policy);
        self.task_completed = outcome.completed;
        self.task_failed = outcome.failed;
        self.fail_message = outcome.message;

        if self.task_completed {
            CheckOutcome::Completed
        } else {
            CheckOutcome::Failed
        }
    }
}

impl Default for LessonRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LessonRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonRunner")
            .field("lesson", &self.lesson.as_ref().map(|l| l.id().as_str()))
            .field("step_index", &self.step_index)
            .field("state", &self.state)
            .field("task_completed", &self.task_completed)
            .field("task_failed", &self.task_failed)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
