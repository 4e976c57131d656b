//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Week programs, one row per issue, week and language
CREATE TABLE IF NOT EXISTS mwb_weeks (
    id TEXT PRIMARY KEY,
    issue_key TEXT NOT NULL,
    language TEXT NOT NULL,
    week_date TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),

    UNIQUE(issue_key, week_date, language)
);

CREATE INDEX IF NOT EXISTS idx_mwb_weeks_issue ON mwb_weeks(issue_key, language);
CREATE INDEX IF NOT EXISTS idx_mwb_weeks_week_date ON mwb_weeks(week_date);
"#;
