use lesson_core::EngineState;

/// Point-in-time view of a runner, useful for UI polling.
///
/// The `revision` counter increments on every observable mutation, so a
/// presentation layer can poll it cheaply and re-read only on change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSnapshot {
    pub state: EngineState,
    pub step_index: usize,
    pub total_steps: usize,
    pub is_last_step: bool,
    pub task_completed: bool,
    pub task_failed: bool,
    pub fail_message: String,
    pub user_code: String,
    pub revision: u64,
}
