use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use lesson_core::Clock;
use lesson_core::model::{LessonId, ProgressRecord, UserId};
use storage::repository::{ProgressRepository, ProgressSync, SyncUpdate};

use crate::content::ContentProvider;
use crate::error::FlowError;
use super::engine::{AutoAdvance, CheckOutcome, LessonRunner, NextOutcome, StepAdvance};

/// Orchestrates a runner against its collaborators: content loading with
/// resume, persistence on forward progress, and timer scheduling.
///
/// Persistence is dual-write: the local cache save is awaited but its
/// failure is swallowed, and the remote push is spawned fire-and-forget.
/// Neither can fail a state transition.
#[derive(Clone)]
pub struct LessonFlowService {
    clock: Clock,
    content: Arc<dyn ContentProvider>,
    progress: Arc<dyn ProgressRepository>,
    sync: Arc<dyn ProgressSync>,
    user_id: Option<UserId>,
}

impl LessonFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn ContentProvider>,
        progress: Arc<dyn ProgressRepository>,
        sync: Arc<dyn ProgressSync>,
    ) -> Self {
        Self {
            clock,
            content,
            progress,
            sync,
            user_id: None,
        }
    }

    /// Attribute progress writes to a user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Load a lesson into the runner, restoring a cached position when
    /// one exists.
    ///
    /// The resume read is best effort: a storage failure is logged and
    /// treated as no prior progress. A content failure leaves the runner
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Content` when the lesson cannot be fetched or
    /// fails validation.
    pub async fn load(
        &self,
        runner: &mut LessonRunner,
        lesson_ref: &str,
    ) -> Result<AutoAdvance, FlowError> {
        runner.reset();
        let lesson = self.content.load(lesson_ref).await?;

        let resume = match self
            .progress
            .load_progress(self.user_id.as_ref(), lesson.id())
            .await
        {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, lesson_id = %lesson.id(), "ignoring unreadable progress cache");
                None
            }
        };

        Ok(runner.install_lesson(lesson, resume.as_ref()))
    }

    /// Advance one phase; persists when a new step is entered.
    pub async fn next(&self, runner: &mut LessonRunner) -> NextOutcome {
        let outcome = runner.next();
        if let NextOutcome::Step(StepAdvance::Entered { step_index, .. }) = &outcome {
            self.persist(runner, *step_index, false).await;
        }
        outcome
    }

    /// Force-advance to the next step; persists when a new step is
    /// entered. Completion issues no extra write.
    pub async fn next_step(&self, runner: &mut LessonRunner) -> Option<StepAdvance> {
        let advance = runner.next_step();
        if let Some(StepAdvance::Entered { step_index, .. }) = &advance {
            self.persist(runner, *step_index, false).await;
        }
        advance
    }

    /// Move back one step. Never persists: backward movement is not
    /// forward progress.
    pub fn previous_step(&self, runner: &mut LessonRunner) -> Option<AutoAdvance> {
        runner.previous_step()
    }

    /// Check a task submission; a successful completion persists the
    /// current position with the completed flag set.
    pub async fn check_task(&self, runner: &mut LessonRunner, code: &str) -> CheckOutcome {
        let outcome = runner.check_task(code);
        if outcome == CheckOutcome::Completed {
            self.persist(runner, runner.step_index(), true).await;
        }
        outcome
    }

    /// Schedule the timed `Explain -> Animate` transition for a shared
    /// runner. The spawned task relies on the generation token, not on
    /// being aborted, for correctness.
    pub fn schedule_auto_advance(
        &self,
        runner: Arc<Mutex<LessonRunner>>,
        auto: AutoAdvance,
    ) -> tokio::task::JoinHandle<bool> {
        tokio::spawn(async move {
            tokio::time::sleep(auto.delay).await;
            runner.lock().await.fire_auto_advance(auto.generation)
        })
    }

    async fn persist(&self, runner: &LessonRunner, step_index: usize, completed: bool) {
        let Some(lesson_id) = runner.lesson().map(|l| l.id().clone()) else {
            return;
        };
        self.write_progress(lesson_id, step_index, completed).await;
    }

    async fn write_progress(&self, lesson_id: LessonId, step_index: usize, completed: bool) {
        let timestamp = self.clock.now();
        let record = ProgressRecord::new(lesson_id.clone(), step_index, timestamp);

        if let Err(error) = self
            .progress
            .save_progress(self.user_id.as_ref(), &record)
            .await
        {
            warn!(%error, %lesson_id, step_index, "failed to cache progress");
        }

        let sync = Arc::clone(&self.sync);
        let update = SyncUpdate {
            user_id: self.user_id,
            lesson_id,
            step_index,
            completed,
            timestamp,
        };
        tokio::spawn(async move {
            if let Err(error) = sync.push(&update).await {
                warn!(%error, lesson_id = %update.lesson_id, "failed to sync progress");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StaticContentProvider;
    use lesson_core::model::{Lesson, Step, StepId};
    use lesson_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn build_service(repo: &InMemoryRepository) -> LessonFlowService {
        let lesson = Lesson::new(
            lesson_core::model::LessonId::new("l1"),
            "html",
            "Basics",
            vec![
                Step::new(StepId::new("s1"), "one"),
                Step::new(StepId::new("s2"), "two"),
            ],
        )
        .unwrap();
        let content = StaticContentProvider::new().with_lesson("l1", lesson);

        LessonFlowService::new(
            fixed_clock(),
            Arc::new(content),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn load_failure_leaves_runner_unstarted() {
        let repo = InMemoryRepository::new();
        let service = build_service(&repo);
        let mut runner = LessonRunner::new();

        let err = service.load(&mut runner, "missing").await.unwrap_err();
        assert!(matches!(err, FlowError::Content(_)));
        assert_eq!(runner.state(), lesson_core::EngineState::Init);
        assert!(runner.lesson().is_none());
    }

    #[tokio::test]
    async fn failed_reload_resets_a_previous_lesson() {
        let repo = InMemoryRepository::new();
        let service = build_service(&repo);
        let mut runner = LessonRunner::new();

        service.load(&mut runner, "l1").await.unwrap();
        assert!(runner.lesson().is_some());

        let err = service.load(&mut runner, "missing").await.unwrap_err();
        assert!(matches!(err, FlowError::Content(_)));
        assert_eq!(runner.state(), lesson_core::EngineState::Init);
        assert!(runner.lesson().is_none());
    }

    #[tokio::test]
    async fn scheduled_auto_advance_respects_generation() {
        let repo = InMemoryRepository::new();
        let service = build_service(&repo);

        let runner = Arc::new(Mutex::new(LessonRunner::new()));
        let auto = {
            let mut guard = runner.lock().await;
            service.load(&mut guard, "l1").await.unwrap()
        };

        // Short delay so the test stays fast; the generation is what matters.
        let auto = AutoAdvance {
            delay: std::time::Duration::from_millis(5),
            ..auto
        };
        let fired = service
            .schedule_auto_advance(Arc::clone(&runner), auto)
            .await
            .unwrap();
        assert!(fired);
        assert_eq!(
            runner.lock().await.state(),
            lesson_core::EngineState::Animate
        );
    }

    #[tokio::test]
    async fn stale_scheduled_auto_advance_is_a_noop() {
        let repo = InMemoryRepository::new();
        let service = build_service(&repo);

        let runner = Arc::new(Mutex::new(LessonRunner::new()));
        let auto = {
            let mut guard = runner.lock().await;
            service.load(&mut guard, "l1").await.unwrap()
        };

        // The user moves on before the timer fires.
        {
            let mut guard = runner.lock().await;
            guard.next();
        }

        let auto = AutoAdvance {
            delay: std::time::Duration::from_millis(5),
            ..auto
        };
        let fired = service
            .schedule_auto_advance(Arc::clone(&runner), auto)
            .await
            .unwrap();
        assert!(!fired);
        assert_eq!(
            runner.lock().await.state(),
            lesson_core::EngineState::Animate
        );
    }
}
