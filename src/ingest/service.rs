//! Edition ingest pipeline: fetch, parse, merge and store

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;

use super::fetcher::SourceFetcher;
use super::types::{IngestError, IngestSummary, IssueReport, PullMode};
use crate::config::SourceConfig;
use crate::db::WeekRepository;
use crate::program::{
    edition_url, extract_edition_pdf_url, extract_weekly_links, issue_key, merge_weeks,
    parse_month_text, parse_weekly_html, WeekProgram,
};
use crate::text::strip_html;

static URL_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2})").expect("valid regex"));

fn url_year(url: &str) -> Option<i32> {
    URL_YEAR_RE.captures(url)?.get(1)?.as_str().parse().ok()
}

pub struct IngestService<F> {
    fetcher: F,
    pool: SqlitePool,
    source: SourceConfig,
}

impl<F: SourceFetcher> IngestService<F> {
    pub fn new(fetcher: F, pool: SqlitePool, source: SourceConfig) -> Self {
        Self {
            fetcher,
            pool,
            source,
        }
    }

    /// Parse one weekly program page.
    ///
    /// A page that yields neither dates nor parts is read again as plain
    /// text and its first week is used instead.
    pub async fn import_weekly_page(
        &self,
        url: &str,
        year_hint: i32,
    ) -> Result<WeekProgram, IngestError> {
        let html = self.fetcher.fetch_text(url).await?;
        let year = url_year(url).unwrap_or(year_hint);

        let week = parse_weekly_html(&html, year)?;
        if week.parts.is_empty() && week.has_placeholder_dates() {
            let text = strip_html(&html)?;
            if let Some(first) = parse_month_text(&text, year).into_iter().next() {
                tracing::debug!(url, "weekly page read as plain text");
                return Ok(first);
            }
        }
        Ok(week)
    }

    /// All weeks of one edition page.
    ///
    /// Weekly pages linked from the edition come first; weeks found only in
    /// the edition text fill the gaps. Weeks whose dates could not be
    /// resolved are dropped.
    pub async fn import_edition(
        &self,
        edition_url: &str,
        year_hint: Option<i32>,
    ) -> Result<Vec<WeekProgram>, IngestError> {
        let html = self.fetcher.fetch_text(edition_url).await?;
        let year = year_hint
            .or_else(|| url_year(edition_url))
            .unwrap_or_else(|| Utc::now().year());

        let links = extract_weekly_links(&html, edition_url);
        let from_text = parse_month_text(&strip_html(&html)?, year);
        tracing::debug!(
            edition_url,
            links = links.len(),
            text_weeks = from_text.len(),
            pdf = extract_edition_pdf_url(&html, edition_url).as_deref(),
            "edition page parsed"
        );

        let mut weekly = Vec::with_capacity(links.len());
        for link in &links {
            match self.import_weekly_page(link, year).await {
                Ok(week) => weekly.push(week),
                Err(e) => tracing::warn!(url = %link, error = %e, "skipping weekly page"),
            }
        }

        let weeks = merge_weeks(weekly, from_text)
            .into_iter()
            .filter(|week| {
                let resolved = !week.has_placeholder_dates();
                if !resolved {
                    tracing::warn!(period = %week.period, "skipping week without dates");
                }
                resolved
            })
            .collect();
        Ok(weeks)
    }

    /// Import and store one issue; failures are reported, never raised
    pub async fn ingest_issue(&self, year: i32, month_start: u32) -> IssueReport {
        let key = issue_key(year, month_start);
        let url = edition_url(&self.source.base_url, year, month_start);
        tracing::info!(issue_key = %key, url = %url, "ingesting issue");

        match self.store_edition(&key, &url, year).await {
            Ok(weeks) => {
                tracing::info!(issue_key = %key, weeks, "issue ingested");
                IssueReport::stored(key, weeks)
            }
            Err(e) => {
                tracing::warn!(issue_key = %key, error = %e, "issue ingest failed");
                IssueReport::failed(key, &e)
            }
        }
    }

    async fn store_edition(&self, key: &str, url: &str, year: i32) -> Result<usize, IngestError> {
        let weeks = self.import_edition(url, Some(year)).await?;
        if weeks.is_empty() {
            return Ok(0);
        }

        WeekRepository::new(&self.pool)
            .upsert_weeks(key, &self.source.language, &weeks)
            .await
            .map_err(|e| IngestError::Database(e.to_string()))
    }

    /// Ingest every issue of `mode`, pausing between issues
    pub async fn run_mode(&self, mode: PullMode, today: NaiveDate) -> IngestSummary {
        let issues = mode.issues(today);
        tracing::info!(mode = mode.name(), issues = issues.len(), "ingest run started");

        let mut reports = Vec::with_capacity(issues.len());
        for (i, (year, month_start)) in issues.into_iter().enumerate() {
            if i > 0 && self.source.request_delay_ms > 0 {
                tokio::time::sleep(self.source.request_delay()).await;
            }
            reports.push(self.ingest_issue(year, month_start).await);
        }

        IngestSummary::new(mode, reports)
    }
}
