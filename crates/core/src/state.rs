use std::fmt;

/// Sub-state within a step's presentation lifecycle.
///
/// `Complete` is terminal for a lesson, but a runner holding it can still
/// load the next lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No step is active yet.
    Init,
    /// The step's explanation is shown.
    Explain,
    /// The step's visual cue plays.
    Animate,
    /// The step's code sample is shown.
    ShowCode,
    /// Awaiting task input or an explicit advance.
    WaitForUser,
    /// The lesson is finished.
    Complete,
}

impl EngineState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Init => "INIT",
            EngineState::Explain => "EXPLAIN",
            EngineState::Animate => "ANIMATE",
            EngineState::ShowCode => "SHOW_CODE",
            EngineState::WaitForUser => "WAIT_FOR_USER",
            EngineState::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
