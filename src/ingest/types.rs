//! Ingest modes, reports and errors

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::program::{bimester_start, next_issue};
use crate::text::TextError;

/// Years covered by a backfill when no start year is given
const BACKFILL_YEARS: i32 = 6;
/// Widest backfill a single request may ask for
const MAX_BACKFILL_SPAN: i32 = 10;
/// Years a workbook edition can exist for
const EDITION_YEARS: std::ops::RangeInclusive<i32> = 2016..=2100;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Page parsing failed: {0}")]
    Parse(#[from] TextError),

    #[error("Storing weeks failed: {0}")]
    Database(String),
}

/// Which issues one ingest run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// One issue; defaults to the one covering today
    Single {
        year: Option<i32>,
        month_start: Option<u32>,
    },
    /// The issue after the current one
    Next,
    /// The current issue and the next one
    Pair,
    /// Every issue of a range of years
    Backfill {
        start_year: Option<i32>,
        end_year: Option<i32>,
    },
}

impl PullMode {
    pub fn name(&self) -> &'static str {
        match self {
            PullMode::Single { .. } => "single",
            PullMode::Next => "next",
            PullMode::Pair => "pair",
            PullMode::Backfill { .. } => "backfill",
        }
    }

    /// `(year, month_start)` of every issue the mode covers, in ingest order
    pub fn issues(&self, today: NaiveDate) -> Vec<(i32, u32)> {
        let current = (today.year(), bimester_start(today.month()));
        match *self {
            PullMode::Single { year, month_start } => vec![(
                year.unwrap_or(current.0),
                month_start.map_or(current.1, bimester_start),
            )],
            PullMode::Next => vec![next_issue(current.0, current.1)],
            PullMode::Pair => vec![current, next_issue(current.0, current.1)],
            PullMode::Backfill {
                start_year,
                end_year,
            } => {
                let start = start_year.unwrap_or(today.year() - BACKFILL_YEARS);
                let end = end_year.unwrap_or(today.year());
                (start..=end)
                    .flat_map(|year| (1..=11).step_by(2).map(move |month| (year, month)))
                    .collect()
            }
        }
    }
}

/// Query string of a pull request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestQuery {
    pub mode: Option<String>,
    pub year: Option<i32>,
    pub month_start: Option<u32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl TryFrom<IngestQuery> for PullMode {
    type Error = String;

    /// Unknown modes pull a single issue
    fn try_from(query: IngestQuery) -> Result<Self, Self::Error> {
        if let Some(month) = query.month_start {
            if !(1..=12).contains(&month) {
                return Err(format!("month_start out of range: {month}"));
            }
        }
        for year in [query.year, query.start_year, query.end_year].into_iter().flatten() {
            if !EDITION_YEARS.contains(&year) {
                return Err(format!("year out of range: {year}"));
            }
        }
        if let (Some(start), Some(end)) = (query.start_year, query.end_year) {
            if start > end {
                return Err(format!("start_year {start} is after end_year {end}"));
            }
            if end - start >= MAX_BACKFILL_SPAN {
                return Err(format!(
                    "backfill spans more than {MAX_BACKFILL_SPAN} years: {start}-{end}"
                ));
            }
        }

        Ok(match query.mode.as_deref().unwrap_or("single") {
            "next" => PullMode::Next,
            "pair" => PullMode::Pair,
            "backfill" => PullMode::Backfill {
                start_year: query.start_year,
                end_year: query.end_year,
            },
            _ => PullMode::Single {
                year: query.year,
                month_start: query.month_start,
            },
        })
    }
}

/// Outcome of ingesting one issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub issue_key: String,
    pub weeks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IssueReport {
    pub fn stored(issue_key: String, weeks: usize) -> Self {
        Self {
            issue_key,
            weeks,
            error: None,
        }
    }

    pub fn failed(issue_key: String, error: &IngestError) -> Self {
        Self {
            issue_key,
            weeks: 0,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub status: &'static str,
    pub mode: &'static str,
    pub total_weeks: usize,
    pub issues: Vec<IssueReport>,
}

impl IngestSummary {
    pub fn new(mode: PullMode, issues: Vec<IssueReport>) -> Self {
        Self {
            status: "ok",
            mode: mode.name(),
            total_weeks: issues.iter().map(|r| r.weeks).sum(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 10).unwrap()
    }

    #[test]
    fn test_single_defaults_to_current_issue() {
        let mode = PullMode::Single {
            year: None,
            month_start: None,
        };
        assert_eq!(mode.issues(today()), vec![(2026, 11)]);

        let mode = PullMode::Single {
            year: Some(2025),
            month_start: Some(4),
        };
        assert_eq!(mode.issues(today()), vec![(2025, 3)]);
    }

    #[test]
    fn test_next_and_pair_wrap_year() {
        assert_eq!(PullMode::Next.issues(today()), vec![(2027, 1)]);
        assert_eq!(PullMode::Pair.issues(today()), vec![(2026, 11), (2027, 1)]);
    }

    #[test]
    fn test_backfill_range() {
        let mode = PullMode::Backfill {
            start_year: Some(2025),
            end_year: None,
        };
        let issues = mode.issues(today());
        assert_eq!(issues.len(), 12);
        assert_eq!(issues.first(), Some(&(2025, 1)));
        assert_eq!(issues.last(), Some(&(2026, 11)));

        let default = PullMode::Backfill {
            start_year: None,
            end_year: None,
        };
        assert_eq!(default.issues(today()).len(), 7 * 6);
    }

    #[test]
    fn test_mode_from_query() {
        let query = IngestQuery {
            mode: Some("backfill".into()),
            start_year: Some(2020),
            ..IngestQuery::default()
        };
        assert_eq!(
            PullMode::try_from(query),
            Ok(PullMode::Backfill {
                start_year: Some(2020),
                end_year: None
            })
        );

        let unknown = IngestQuery {
            mode: Some("everything".into()),
            ..IngestQuery::default()
        };
        assert!(matches!(
            PullMode::try_from(unknown),
            Ok(PullMode::Single { .. })
        ));

        let bad_month = IngestQuery {
            month_start: Some(13),
            ..IngestQuery::default()
        };
        assert!(PullMode::try_from(bad_month).is_err());
    }

    fn backfill_query(start_year: i32, end_year: i32) -> IngestQuery {
        IngestQuery {
            mode: Some("backfill".into()),
            start_year: Some(start_year),
            end_year: Some(end_year),
            ..IngestQuery::default()
        }
    }

    #[test]
    fn test_backfill_rejects_inverted_range() {
        let err = PullMode::try_from(backfill_query(2030, 2020)).unwrap_err();
        assert!(err.contains("after"));
        assert!(PullMode::try_from(backfill_query(2024, 2024)).is_ok());
    }

    #[test]
    fn test_backfill_rejects_wide_or_implausible_years() {
        assert!(PullMode::try_from(backfill_query(2016, 2026)).is_err());
        assert!(PullMode::try_from(backfill_query(2017, 2026)).is_ok());
        assert!(PullMode::try_from(backfill_query(-2_000_000, 2026)).is_err());

        let far_single = IngestQuery {
            year: Some(9999),
            ..IngestQuery::default()
        };
        assert!(PullMode::try_from(far_single).is_err());
    }

    #[test]
    fn test_summary_totals() {
        let reports = vec![
            IssueReport::stored("2026-01".into(), 9),
            IssueReport::failed(
                "2026-03".into(),
                &IngestError::Status {
                    url: "u".into(),
                    status: 500,
                },
            ),
        ];
        let summary = IngestSummary::new(PullMode::Pair, reports);
        assert_eq!(summary.total_weeks, 9);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "pair");
        assert_eq!(json["totalWeeks"], 9);
        assert_eq!(json["issues"][1]["issueKey"], "2026-03");
        assert!(json["issues"][0].get("error").is_none());
    }
}
