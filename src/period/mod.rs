//! Date/period resolution
//!
//! Resolves the free-form period phrases printed on workbook pages
//! ("2-8 de fevereiro", "29 de dezembro–4 de janeiro de 2026",
//! "March 2-8, 2026") into concrete start/end dates, and formats a range
//! back into the normalized Portuguese phrase stored with each week.
//!
//! Resolution never fails: a phrase that matches no known shape resolves to
//! January 1st of the fallback year, reported as [`PeriodShape::Fallback`].

mod months;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

pub use months::{month_number, portuguese_name};

const ORDINAL: &str = r"(?:\s*(?:\.º|º|°))?";
const MONTH: &str = r"([A-Za-zÀ-ÿ.]+)";

static CROSS_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(\d{{1,2}}){o}\s*(?:de\s+)?{m}(?:\s+de\s+(\d{{4}}))?\s*(?:[–—-]|\s+a\s+)\s*(\d{{1,2}}){o}\s*(?:de\s+)?{m}(?:\s+de\s+(\d{{4}}))?",
        o = ORDINAL,
        m = MONTH
    );
    Regex::new(&pattern).expect("valid regex")
});

static SAME_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(\d{{1,2}}){o}\s*(?:[–—-]|\s+a\s+)\s*(\d{{1,2}}){o}\s+de\s+{m}(?:\s+de\s+(\d{{4}}))?",
        o = ORDINAL,
        m = MONTH
    );
    Regex::new(&pattern).expect("valid regex")
});

static ENGLISH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Za-z]+)\.?\s+(\d{1,2})\s*[–—-]\s*(\d{1,2}),?\s*(\d{4})?")
        .expect("valid regex")
});

/// Inclusive date range of one meeting week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    #[serde(rename = "dataInicio")]
    pub start: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end: NaiveDate,
}

impl PeriodRange {
    /// The range used when no phrase could be resolved
    pub fn fallback(year: i32) -> Self {
        let day = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        Self { start: day, end: day }
    }

    pub fn is_fallback(&self, year: i32) -> bool {
        *self == Self::fallback(year)
    }

    /// Start and end on January 1st of the same year, which no real week does
    pub fn is_placeholder(&self) -> bool {
        self.start == self.end && self.start.month() == 1 && self.start.day() == 1
    }
}

/// Which phrase shape produced a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodShape {
    CrossMonth,
    SameMonth,
    English,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    #[serde(flatten)]
    pub range: PeriodRange,
    pub shape: PeriodShape,
}

/// Resolve a period phrase to a date range.
pub fn resolve_period(phrase: &str, fallback_year: i32) -> PeriodRange {
    resolve_period_detailed(phrase, fallback_year).range
}

/// Resolve a period phrase, also reporting which shape matched.
///
/// Shapes are tried in order: cross-month, same-month, English. Within a
/// shape the first match that yields real calendar dates wins.
pub fn resolve_period_detailed(phrase: &str, fallback_year: i32) -> ResolvedPeriod {
    let attempts: [(PeriodShape, &Regex, fn(&Captures, i32) -> Option<PeriodRange>); 3] = [
        (PeriodShape::CrossMonth, &*CROSS_MONTH_RE, cross_month),
        (PeriodShape::SameMonth, &*SAME_MONTH_RE, same_month),
        (PeriodShape::English, &*ENGLISH_RE, english),
    ];

    for (shape, re, build) in attempts {
        if let Some(range) = re
            .captures_iter(phrase)
            .find_map(|caps| build(&caps, fallback_year))
        {
            return ResolvedPeriod { range, shape };
        }
    }

    tracing::debug!(phrase, fallback_year, "period phrase not recognized");
    ResolvedPeriod {
        range: PeriodRange::fallback(fallback_year),
        shape: PeriodShape::Fallback,
    }
}

/// Format a range as the normalized Portuguese period phrase.
///
/// Same month and year gives `"2-8 de fevereiro de 2026"`, anything else
/// `"29 de dezembro–4 de janeiro de 2026"`.
pub fn format_period(range: &PeriodRange) -> String {
    let (start, end) = (range.start, range.end);
    if start.year() == end.year() && start.month() == end.month() {
        format!(
            "{}-{} de {} de {}",
            start.day(),
            end.day(),
            portuguese_name(start.month()),
            start.year()
        )
    } else {
        format!(
            "{} de {}–{} de {} de {}",
            start.day(),
            portuguese_name(start.month()),
            end.day(),
            portuguese_name(end.month()),
            end.year()
        )
    }
}

fn cross_month(caps: &Captures, fallback_year: i32) -> Option<PeriodRange> {
    let d1 = number(caps, 1)?;
    let m1 = month_number(caps.get(2)?.as_str())?;
    let d2 = number(caps, 4)?;
    let m2 = month_number(caps.get(5)?.as_str())?;
    let rolls_over = m2 < m1;

    let (y1, y2) = match (year(caps, 3), year(caps, 6)) {
        (Some(y1), Some(y2)) => (y1, y2),
        (Some(y1), None) => (y1, if rolls_over { y1 + 1 } else { y1 }),
        (None, Some(y2)) => (if rolls_over { y2 - 1 } else { y2 }, y2),
        (None, None) => (
            fallback_year,
            if rolls_over { fallback_year + 1 } else { fallback_year },
        ),
    };

    build_range((y1, m1, d1), (y2, m2, d2))
}

fn same_month(caps: &Captures, fallback_year: i32) -> Option<PeriodRange> {
    let d1 = number(caps, 1)?;
    let d2 = number(caps, 2)?;
    let month = month_number(caps.get(3)?.as_str())?;
    let y = year(caps, 4).unwrap_or(fallback_year);
    build_range((y, month, d1), (y, month, d2))
}

fn english(caps: &Captures, fallback_year: i32) -> Option<PeriodRange> {
    let month = month_number(caps.get(1)?.as_str())?;
    let d1 = number(caps, 2)?;
    let d2 = number(caps, 3)?;
    let y = year(caps, 4).unwrap_or(fallback_year);
    build_range((y, month, d1), (y, month, d2))
}

fn build_range(start: (i32, u32, u32), end: (i32, u32, u32)) -> Option<PeriodRange> {
    let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2)?;
    let end = NaiveDate::from_ymd_opt(end.0, end.1, end.2)?;
    (start <= end).then_some(PeriodRange { start, end })
}

fn number(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn year(caps: &Captures, group: usize) -> Option<i32> {
    caps.get(group)?.as_str().parse().ok()
}
