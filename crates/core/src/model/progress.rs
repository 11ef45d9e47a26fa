use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

/// Point-in-time snapshot of a lesson position.
///
/// Write-only from the engine's perspective; read back once at load time
/// to offer resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub lesson_id: LessonId,
    pub step_index: usize,
    pub timestamp: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(lesson_id: LessonId, step_index: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            step_index,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = ProgressRecord::new(LessonId::new("l1"), 3, fixed_now());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"lessonId\":\"l1\""));
        assert!(json.contains("\"stepIndex\":3"));

        let back: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
