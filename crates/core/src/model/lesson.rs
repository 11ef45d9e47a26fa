use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{LessonId, StepId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    EmptyId,

    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("lesson has no steps")]
    NoSteps,

    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),
}

//
// ─── DOMAIN TYPES ──────────────────────────────────────────────────────────────
//

/// Animation cue attached to a step. Opaque to the engine; the renderer
/// interprets kind/target/content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visual {
    #[serde(rename = "type")]
    pub kind: VisualKind,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Highlight,
    Appear,
    Type,
    Draw,
    None,
}

/// Extra authored note shown alongside a step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplemental {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SupplementalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplementalKind {
    Tip,
    Example,
    Warning,
}

/// Code language tag for a task's playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Html,
    Css,
    Js,
}

/// An exercise attached to a step.
///
/// `expected` is the pattern the submission is checked against; a task
/// without one is trivially satisfied by any submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub instruction: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub starter_code: Option<String>,
    #[serde(default)]
    pub language: Option<CodeLanguage>,
}

/// One teaching unit: explanation plus optional code, visual cue, task
/// and supplemental note. Immutable once its lesson is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    id: StepId,
    explanation: String,
    code: Option<String>,
    visual: Option<Visual>,
    task: Option<Task>,
    supplemental: Option<Supplemental>,
}

impl Step {
    #[must_use]
    pub fn new(id: StepId, explanation: impl Into<String>) -> Self {
        Self {
            id,
            explanation: explanation.into(),
            code: None,
            visual: None,
            task: None,
            supplemental: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }

    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    #[must_use]
    pub fn with_supplemental(mut self, supplemental: Supplemental) -> Self {
        self.supplemental = Some(supplemental);
        self
    }

    #[must_use]
    pub fn id(&self) -> &StepId {
        &self.id
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn visual(&self) -> Option<&Visual> {
        self.visual.as_ref()
    }

    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    #[must_use]
    pub fn supplemental(&self) -> Option<&Supplemental> {
        self.supplemental.as_ref()
    }
}

/// Immutable ordered collection of steps with identifying metadata.
///
/// Step order is significant and fixed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    topic: String,
    title: String,
    steps: Vec<Step>,
}

impl Lesson {
    /// Builds a lesson, validating that it has at least one step and that
    /// step ids are unique within it.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NoSteps` for an empty step list and
    /// `LessonError::DuplicateStepId` when two steps share an id.
    pub fn new(
        id: LessonId,
        topic: impl Into<String>,
        title: impl Into<String>,
        steps: Vec<Step>,
    ) -> Result<Self, LessonError> {
        if id.as_str().is_empty() {
            return Err(LessonError::EmptyId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        if steps.is_empty() {
            return Err(LessonError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id().clone()) {
                return Err(LessonError::DuplicateStepId(step.id().to_string()));
            }
        }

        Ok(Self {
            id,
            topic: topic.into(),
            title,
            steps,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

//
// ─── WIRE DOCUMENTS ────────────────────────────────────────────────────────────
//

/// Wire shape of a lesson document as served by the content provider.
///
/// This mirrors the authored content format (camelCase JSON converted
/// from YAML) so repositories and providers can deserialize without
/// leaking transport concerns into the domain layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDoc {
    pub id: String,
    pub topic: String,
    pub title: String,
    pub steps: Vec<StepDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDoc {
    pub id: String,
    pub explanation: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub visual: Option<Visual>,
    #[serde(default)]
    pub task: Option<Task>,
    #[serde(default)]
    pub supplemental: Option<Supplemental>,
}

impl LessonDoc {
    /// Convert the document into a validated domain `Lesson`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the document fails lesson validation.
    pub fn into_lesson(self) -> Result<Lesson, LessonError> {
        let steps = self
            .steps
            .into_iter()
            .map(|doc| Step {
                id: StepId::new(doc.id),
                explanation: doc.explanation,
                code: doc.code,
                visual: doc.visual,
                task: doc.task,
                supplemental: doc.supplemental,
            })
            .collect();

        Lesson::new(LessonId::new(self.id), self.topic, self.title, steps)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_step(id: &str) -> Step {
        Step::new(StepId::new(id), format!("explanation for {id}"))
    }

    #[test]
    fn lesson_keeps_step_order() {
        let lesson = Lesson::new(
            LessonId::new("l1"),
            "html",
            "Intro",
            vec![build_step("a"), build_step("b"), build_step("c")],
        )
        .unwrap();

        let ids: Vec<_> = lesson.steps().iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_lesson_is_rejected() {
        let err = Lesson::new(LessonId::new("l1"), "html", "Intro", Vec::new()).unwrap_err();
        assert_eq!(err, LessonError::NoSteps);
    }

    #[test]
    fn duplicate_step_ids_are_rejected() {
        let err = Lesson::new(
            LessonId::new("l1"),
            "html",
            "Intro",
            vec![build_step("a"), build_step("a")],
        )
        .unwrap_err();
        assert_eq!(err, LessonError::DuplicateStepId("a".to_string()));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err =
            Lesson::new(LessonId::new("l1"), "html", "  ", vec![build_step("a")]).unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);
    }

    #[test]
    fn doc_deserializes_and_validates() {
        let json = r##"{
            "id": "html-1",
            "topic": "html",
            "title": "Your first tag",
            "steps": [
                {
                    "id": "s1",
                    "explanation": "Tags wrap content.",
                    "code": "<p>hello</p>",
                    "visual": { "type": "highlight", "target": "#editor" }
                },
                {
                    "id": "s2",
                    "explanation": "Now you try.",
                    "task": {
                        "instruction": "Write a paragraph tag",
                        "expected": "<p>.*</p>",
                        "starterCode": "<!-- here -->",
                        "language": "html"
                    },
                    "supplemental": {
                        "title": "Tip",
                        "content": "Close your tags.",
                        "type": "tip"
                    }
                }
            ]
        }"##;

        let doc: LessonDoc = serde_json::from_str(json).unwrap();
        let lesson = doc.into_lesson().unwrap();

        assert_eq!(lesson.id().as_str(), "html-1");
        assert_eq!(lesson.len(), 2);
        assert_eq!(
            lesson.step(0).unwrap().visual().unwrap().kind,
            VisualKind::Highlight
        );
        let task = lesson.step(1).unwrap().task().unwrap();
        assert_eq!(task.starter_code.as_deref(), Some("<!-- here -->"));
        assert_eq!(task.language, Some(CodeLanguage::Html));
    }

    #[test]
    fn doc_with_duplicate_steps_fails_validation() {
        let json = r#"{
            "id": "l1",
            "topic": "css",
            "title": "Selectors",
            "steps": [
                { "id": "s1", "explanation": "one" },
                { "id": "s1", "explanation": "two" }
            ]
        }"#;

        let doc: LessonDoc = serde_json::from_str(json).unwrap();
        assert!(matches!(
            doc.into_lesson(),
            Err(LessonError::DuplicateStepId(_))
        ));
    }
}
