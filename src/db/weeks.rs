//! Week program database operations

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::program::WeekProgram;

/// Stored week record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredWeek {
    pub id: String,
    pub issue_key: String,
    pub language: String,
    pub week_date: String,
    pub content: Json<WeekProgram>,
    pub created_at: String,
    pub updated_at: String,
}

/// Week program repository
pub struct WeekRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WeekRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the weeks of an issue in one transaction.
    ///
    /// Rows are keyed by `(issue_key, week_date, language)`; the week date is
    /// the start of the week's period.
    pub async fn upsert_weeks(
        &self,
        issue_key: &str,
        language: &str,
        weeks: &[WeekProgram],
    ) -> Result<usize> {
        if weeks.is_empty() {
            return Err(AppError::BadRequest("no_weeks".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for week in weeks {
            let content = serde_json::to_string(week)?;
            sqlx::query(
                r#"
                INSERT INTO mwb_weeks (id, issue_key, language, week_date, content, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(issue_key, week_date, language) DO UPDATE SET
                    content = excluded.content,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(issue_key)
            .bind(language)
            .bind(week.week_date().to_string())
            .bind(&content)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(issue_key, language, weeks = weeks.len(), "weeks upserted");
        Ok(weeks.len())
    }

    /// Delete every week of an issue, optionally only in one language
    pub async fn delete_issue(&self, issue_key: &str, language: Option<&str>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM mwb_weeks
            WHERE issue_key = ? AND (? IS NULL OR language = ?)
            "#,
        )
        .bind(issue_key)
        .bind(language)
        .bind(language)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Weeks of an issue in date order
    pub async fn list_issue(&self, issue_key: &str, language: &str) -> Result<Vec<StoredWeek>> {
        let weeks = sqlx::query_as::<_, StoredWeek>(
            r#"
            SELECT id, issue_key, language, week_date, content, created_at, updated_at
            FROM mwb_weeks
            WHERE issue_key = ? AND language = ?
            ORDER BY week_date ASC
            "#,
        )
        .bind(issue_key)
        .bind(language)
        .fetch_all(self.pool)
        .await?;

        Ok(weeks)
    }

    pub async fn get_week(
        &self,
        issue_key: &str,
        week_date: NaiveDate,
        language: &str,
    ) -> Result<Option<StoredWeek>> {
        let week = sqlx::query_as::<_, StoredWeek>(
            r#"
            SELECT id, issue_key, language, week_date, content, created_at, updated_at
            FROM mwb_weeks
            WHERE issue_key = ? AND week_date = ? AND language = ?
            "#,
        )
        .bind(issue_key)
        .bind(week_date.to_string())
        .bind(language)
        .fetch_optional(self.pool)
        .await?;

        Ok(week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::period::resolve_period;
    use crate::program::Songs;

    fn week(period: &str, reading: &str) -> WeekProgram {
        WeekProgram {
            period: period.to_string(),
            range: resolve_period(period, 2026),
            bible_reading: reading.to_string(),
            songs: Songs::from_numbers(&[1, 2, 3]),
            parts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_list() {
        let pool = memory_pool().await;
        let repo = WeekRepository::new(&pool);

        let weeks = vec![
            week("9-15 de fevereiro de 2026", "ISAÍAS 15–17"),
            week("2-8 de fevereiro de 2026", "ISAÍAS 12–14"),
        ];
        assert_eq!(repo.upsert_weeks("2026-01", "pt-BR", &weeks).await.unwrap(), 2);

        let stored = repo.list_issue("2026-01", "pt-BR").await.unwrap();
        let dates: Vec<&str> = stored.iter().map(|w| w.week_date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-02", "2026-02-09"]);
        assert_eq!(stored[0].content.0, weeks[1]);

        assert!(repo.list_issue("2026-01", "en").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_key() {
        let pool = memory_pool().await;
        let repo = WeekRepository::new(&pool);

        repo.upsert_weeks("2026-01", "pt-BR", &[week("2-8 de fevereiro de 2026", "old")])
            .await
            .unwrap();
        repo.upsert_weeks("2026-01", "pt-BR", &[week("2-8 de fevereiro de 2026", "new")])
            .await
            .unwrap();

        let stored = repo.list_issue("2026-01", "pt-BR").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content.0.bible_reading, "new");

        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let found = repo.get_week("2026-01", date, "pt-BR").await.unwrap();
        assert_eq!(found.map(|w| w.id), Some(stored[0].id.clone()));
    }

    #[tokio::test]
    async fn test_empty_upsert_is_rejected() {
        let pool = memory_pool().await;
        let repo = WeekRepository::new(&pool);
        let err = repo.upsert_weeks("2026-01", "pt-BR", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "no_weeks"));
    }

    #[tokio::test]
    async fn test_delete_issue_by_language() {
        let pool = memory_pool().await;
        let repo = WeekRepository::new(&pool);
        let weeks = [week("2-8 de fevereiro de 2026", "x")];
        repo.upsert_weeks("2026-01", "pt-BR", &weeks).await.unwrap();
        repo.upsert_weeks("2026-01", "en", &weeks).await.unwrap();

        assert_eq!(repo.delete_issue("2026-01", Some("en")).await.unwrap(), 1);
        assert_eq!(repo.list_issue("2026-01", "pt-BR").await.unwrap().len(), 1);

        assert_eq!(repo.delete_issue("2026-01", None).await.unwrap(), 1);
        assert_eq!(repo.delete_issue("2026-03", None).await.unwrap(), 0);
    }
}
