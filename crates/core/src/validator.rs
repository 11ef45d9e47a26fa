//! Pure task validation, independent of the state machine.

use regex::Regex;

use crate::model::Task;

/// Fixed, non-diagnostic message shown when a submission does not match.
pub const FAIL_MESSAGE: &str = "Hmm, that's odd";

/// How a submission is matched against a task's expected pattern.
///
/// This is configuration, not an accident of implementation: hosts pick
/// one and keep it stable for a content set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Regular-expression search over the submission.
    #[default]
    Regex,
    /// Literal substring containment.
    Substring,
}

impl MatchPolicy {
    /// Returns true when `code` satisfies `pattern` under this policy.
    ///
    /// A pattern that fails to compile under the `Regex` policy is a
    /// non-match; author mistakes in content must not panic the engine.
    #[must_use]
    pub fn matches(&self, pattern: &str, code: &str) -> bool {
        match self {
            MatchPolicy::Regex => Regex::new(pattern)
                .map(|re| re.is_match(code))
                .unwrap_or(false),
            MatchPolicy::Substring => code.contains(pattern),
        }
    }
}

/// Outcome of checking a submission against a task.
///
/// Exactly one of `completed`/`failed` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub completed: bool,
    pub failed: bool,
    pub message: String,
}

impl TaskOutcome {
    #[must_use]
    pub fn completed() -> Self {
        Self {
            completed: true,
            failed: false,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn failed() -> Self {
        Self {
            completed: false,
            failed: true,
            message: FAIL_MESSAGE.to_string(),
        }
    }
}

/// Validate a submission against a task.
///
/// Deterministic and side-effect free. A task without an expected pattern
/// is trivially satisfied by any submission, including the empty string.
#[must_use]
pub fn validate(task: &Task, code: &str, policy: MatchPolicy) -> TaskOutcome {
    match task.expected.as_deref() {
        None => TaskOutcome::completed(),
        Some(pattern) => {
            if policy.matches(pattern, code) {
                TaskOutcome::completed()
            } else {
                TaskOutcome::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_expecting(expected: Option<&str>) -> Task {
        Task {
            instruction: "do the thing".to_string(),
            expected: expected.map(str::to_string),
            starter_code: None,
            language: None,
        }
    }

    #[test]
    fn no_expected_pattern_accepts_anything() {
        let task = task_expecting(None);
        assert!(validate(&task, "whatever", MatchPolicy::Regex).completed);
        assert!(validate(&task, "", MatchPolicy::Regex).completed);
        assert!(validate(&task, "", MatchPolicy::Substring).completed);
    }

    #[test]
    fn regex_policy_searches_the_submission() {
        let task = task_expecting(Some(r"const\s+x"));
        let hit = validate(&task, "const x = 1;", MatchPolicy::Regex);
        assert!(hit.completed);
        assert!(!hit.failed);
        assert!(hit.message.is_empty());

        let miss = validate(&task, "let x = 1;", MatchPolicy::Regex);
        assert!(!miss.completed);
        assert!(miss.failed);
        assert_eq!(miss.message, FAIL_MESSAGE);
    }

    #[test]
    fn substring_policy_is_literal() {
        let task = task_expecting(Some(r"const\s+x"));
        // The regex escape is not a literal substring of the submission.
        assert!(validate(&task, "const x = 1;", MatchPolicy::Substring).failed);
        assert!(validate(&task, r"const\s+x here", MatchPolicy::Substring).completed);
    }

    #[test]
    fn invalid_regex_is_a_non_match() {
        let task = task_expecting(Some("([unclosed"));
        let outcome = validate(&task, "([unclosed", MatchPolicy::Regex);
        assert!(outcome.failed);
        assert_eq!(outcome.message, FAIL_MESSAGE);
    }

    #[test]
    fn outcome_flags_are_mutually_exclusive() {
        let task = task_expecting(Some("x"));
        for code in ["x", "y", ""] {
            let outcome = validate(&task, code, MatchPolicy::Regex);
            assert_ne!(outcome.completed, outcome.failed);
        }
    }
}
