//! Lesson content boundary: the provider contract plus HTTP and static
//! implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use url::Url;

use lesson_core::model::{Lesson, LessonDoc};

use crate::error::ContentError;

/// Supplies an immutable `Lesson` given a reference.
///
/// The content format is owned by the collaborator serving it; the engine
/// only sees the decoded, validated lesson.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch and validate the lesson for `lesson_ref`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` when no content exists for the
    /// reference, or transport/validation errors otherwise.
    async fn load(&self, lesson_ref: &str) -> Result<Lesson, ContentError>;
}

/// Content provider backed by the lessons HTTP API.
#[derive(Debug, Clone)]
pub struct HttpContentProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpContentProvider {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn load(&self, lesson_ref: &str) -> Result<Lesson, ContentError> {
        let url = self
            .base_url
            .join(&format!("api/lessons/{lesson_ref}"))
            .map_err(|_| ContentError::InvalidRef {
                lesson_ref: lesson_ref.to_string(),
            })?;

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound {
                lesson_ref: lesson_ref.to_string(),
            });
        }

        let doc: LessonDoc = response.error_for_status()?.json().await?;
        Ok(doc.into_lesson()?)
    }
}

/// In-memory provider for tests and embedded content.
#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    lessons: HashMap<String, Lesson>,
}

impl StaticContentProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lesson under a reference.
    pub fn insert(&mut self, lesson_ref: impl Into<String>, lesson: Lesson) {
        self.lessons.insert(lesson_ref.into(), lesson);
    }

    #[must_use]
    pub fn with_lesson(mut self, lesson_ref: impl Into<String>, lesson: Lesson) -> Self {
        self.insert(lesson_ref, lesson);
        self
    }
}

#[async_trait]
impl ContentProvider for StaticContentProvider {
    async fn load(&self, lesson_ref: &str) -> Result<Lesson, ContentError> {
        self.lessons
            .get(lesson_ref)
            .cloned()
            .ok_or_else(|| ContentError::NotFound {
                lesson_ref: lesson_ref.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{LessonId, Step, StepId};

    fn build_lesson(id: &str) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            "html",
            "Intro",
            vec![Step::new(StepId::new("s1"), "hello")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn static_provider_serves_registered_lessons() {
        let provider = StaticContentProvider::new().with_lesson("html/1", build_lesson("html-1"));

        let lesson = provider.load("html/1").await.unwrap();
        assert_eq!(lesson.id().as_str(), "html-1");

        let err = provider.load("html/2").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound { lesson_ref } if lesson_ref == "html/2"));
    }
}
