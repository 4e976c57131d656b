//! Schedule parsing and period resolution routes

use axum::{routing::post, Json, Router};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::period::{format_period, resolve_period_detailed, ResolvedPeriod};
use crate::schedule::{ParseOptions, ParseOutcome, ParseStrategy, ScheduleParser};
use crate::state::AppState;
use crate::text::normalize_pdf_text;

/// Create the schedule router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/parse", post(parse_schedule_text))
        .route("/period", post(resolve_period_phrase))
}

/// Extracted PDF text and parse options
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub text: String,
    #[serde(default)]
    pub strategy: Option<ParseStrategy>,
    #[serde(default)]
    pub first_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRequest {
    pub phrase: String,
    #[serde(default)]
    pub fallback_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    #[serde(flatten)]
    pub resolved: ResolvedPeriod,
    #[serde(rename = "periodo")]
    pub period: String,
}

/// Parse the text of a schedule PDF into meetings
async fn parse_schedule_text(Json(request): Json<ParseRequest>) -> Result<Json<ParseOutcome>> {
    let mut options = ParseOptions::default();
    if let Some(strategy) = request.strategy {
        options = options.with_strategy(strategy);
    }
    if let Some(year) = request.first_year {
        options = options.with_first_year(year);
    }

    let lines = normalize_pdf_text(&request.text);
    let outcome = ScheduleParser::new(options).parse(&lines);
    tracing::debug!(
        lines = lines.len(),
        meetings = outcome.meetings.len(),
        warnings = outcome.warnings.len(),
        "schedule parsed"
    );
    Ok(Json(outcome))
}

/// Resolve a period phrase to dates
async fn resolve_period_phrase(Json(request): Json<PeriodRequest>) -> Result<Json<PeriodResponse>> {
    let year = request.fallback_year.unwrap_or_else(|| Utc::now().year());
    let resolved = resolve_period_detailed(&request.phrase, year);
    Ok(Json(PeriodResponse {
        period: format_period(&resolved.range),
        resolved,
    }))
}
