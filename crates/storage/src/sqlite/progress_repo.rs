use chrono::{DateTime, Duration, Utc};
use sqlx::Row;

use lesson_core::model::{LessonId, ProgressRecord, UserId};

use super::SqliteRepository;
use crate::repository::{PROGRESS_RETENTION_DAYS, ProgressRepository, StorageError, user_key};

fn index_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("step_index overflow".into()))
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn save_progress(
        &self,
        user_id: Option<&UserId>,
        record: &ProgressRecord,
    ) -> Result<(), StorageError> {
        let step_index = index_i64(record.step_index)?;

        sqlx::query(
            r"
                INSERT INTO lessons_progress (user_id, lesson_id, step_index, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                    step_index = excluded.step_index,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(user_key(user_id))
        .bind(record.lesson_id.as_str().to_owned())
        .bind(step_index)
        .bind(record.timestamp)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load_progress(
        &self,
        user_id: Option<&UserId>,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT step_index, updated_at
                FROM lessons_progress
                WHERE user_id = ?1 AND lesson_id = ?2
            ",
        )
        .bind(user_key(user_id))
        .bind(lesson_id.as_str().to_owned())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // A row that fails to decode is treated as no prior progress, not
        // as a load failure.
        let step_index: i64 = match row.try_get("step_index") {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        let updated_at: DateTime<Utc> = match row.try_get("updated_at") {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        let Ok(step_index) = usize::try_from(step_index) else {
            return Ok(None);
        };

        if Utc::now() - updated_at > Duration::days(PROGRESS_RETENTION_DAYS) {
            return Ok(None);
        }

        Ok(Some(ProgressRecord::new(
            lesson_id.clone(),
            step_index,
            updated_at,
        )))
    }
}
