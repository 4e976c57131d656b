//! Week program ingest API routes

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{StoredWeek, WeekRepository};
use crate::error::{AppError, Result};
use crate::ingest::{IngestQuery, IngestSummary, PullMode};
use crate::program::WeekProgram;
use crate::state::AppState;

/// Create the ingest router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingest", get(pull_issues).post(push_weeks))
        .route("/weeks/:issue_key", get(list_weeks))
        .route("/weeks/:issue_key/:week_date", get(get_week))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum IngestAction {
    #[default]
    Upsert,
    DeleteIssue,
}

/// Body of a push request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestRequest {
    #[serde(default)]
    action: IngestAction,
    issue_key: Option<String>,
    language: Option<String>,
    #[serde(default)]
    weeks: Vec<WeekProgram>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    status: &'static str,
    issue_key: String,
    weeks: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    status: &'static str,
    issue_key: String,
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct WeeksQuery {
    language: Option<String>,
}

/// Store weeks pushed by a client, or delete an issue.
///
/// Malformed bodies are a 400, not a JSON extractor rejection.
async fn push_weeks(State(state): State<AppState>, body: Bytes) -> Result<Json<serde_json::Value>> {
    let request: IngestRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("invalid payload".to_string()))?;
    let issue_key = request
        .issue_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("invalid payload".to_string()))?;
    let language = request
        .language
        .unwrap_or_else(|| state.config().source.language.clone());

    let repo = WeekRepository::new(state.db());
    let response = match request.action {
        IngestAction::DeleteIssue => {
            let deleted = repo.delete_issue(&issue_key, Some(&language)).await?;
            tracing::info!(issue_key = %issue_key, deleted, "issue deleted");
            serde_json::to_value(DeleteResponse {
                status: "ok",
                issue_key,
                deleted,
            })?
        }
        IngestAction::Upsert => {
            if request.weeks.is_empty() {
                return Err(AppError::BadRequest("weeks_required".to_string()));
            }
            let weeks = repo.upsert_weeks(&issue_key, &language, &request.weeks).await?;
            serde_json::to_value(UpsertResponse {
                status: "ok",
                issue_key,
                weeks,
            })?
        }
    };
    Ok(Json(response))
}

/// Pull editions from the source site
async fn pull_issues(
    State(state): State<AppState>,
    Query(query): Query<IngestQuery>,
) -> Result<Json<IngestSummary>> {
    let mode = PullMode::try_from(query).map_err(AppError::BadRequest)?;
    let today = Utc::now().date_naive();
    let summary = state.ingest_service().run_mode(mode, today).await;
    Ok(Json(summary))
}

/// Stored weeks of an issue
async fn list_weeks(
    State(state): State<AppState>,
    Path(issue_key): Path<String>,
    Query(query): Query<WeeksQuery>,
) -> Result<Json<Vec<StoredWeek>>> {
    let language = query
        .language
        .unwrap_or_else(|| state.config().source.language.clone());
    let weeks = WeekRepository::new(state.db())
        .list_issue(&issue_key, &language)
        .await?;
    Ok(Json(weeks))
}

/// One stored week, by its start date
async fn get_week(
    State(state): State<AppState>,
    Path((issue_key, week_date)): Path<(String, String)>,
    Query(query): Query<WeeksQuery>,
) -> Result<Json<StoredWeek>> {
    let date = NaiveDate::parse_from_str(&week_date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid week date: {week_date}")))?;
    let language = query
        .language
        .unwrap_or_else(|| state.config().source.language.clone());

    WeekRepository::new(state.db())
        .get_week(&issue_key, date, &language)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("week {issue_key}/{week_date}")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{send, test_state};

    fn week_json(start: &str, end: &str) -> serde_json::Value {
        json!({
            "periodo": "semana",
            "dataInicio": start,
            "dataFim": end,
            "leituraBiblica": "ISAÍAS 1–2",
            "canticos": { "inicial": 1, "meio": 2, "final": 3 },
            "partes": [
                { "numero": 1, "titulo": "Tema", "duracao": 10, "secao": "tesouros", "tipo": "discurso" }
            ]
        })
    }

    #[tokio::test]
    async fn test_upsert_then_list() {
        let state = test_state().await;
        let body = json!({
            "issueKey": "2026-01",
            "weeks": [week_json("2026-01-12", "2026-01-18"), week_json("2026-01-05", "2026-01-11")]
        });
        let (status, response) = send(&state, "POST", "/api/v1/mwb/ingest", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({ "status": "ok", "issueKey": "2026-01", "weeks": 2 }));

        let (status, weeks) = send(&state, "GET", "/api/v1/mwb/weeks/2026-01", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(weeks[0]["week_date"], "2026-01-05");
        assert_eq!(weeks[0]["content"]["partes"][0]["titulo"], "Tema");
        assert_eq!(weeks[1]["language"], "pt-BR");
    }

    #[tokio::test]
    async fn test_get_single_week() {
        let state = test_state().await;
        let body = json!({ "issueKey": "2026-01", "weeks": [week_json("2026-01-05", "2026-01-11")] });
        send(&state, "POST", "/api/v1/mwb/ingest", Some(body)).await;

        let (status, week) =
            send(&state, "GET", "/api/v1/mwb/weeks/2026-01/2026-01-05", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(week["content"]["dataFim"], "2026-01-11");

        let (status, response) =
            send(&state, "GET", "/api/v1/mwb/weeks/2026-01/2026-01-12", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(response["error"], "not_found");

        let (status, _) = send(&state, "GET", "/api/v1/mwb/weeks/2026-01/amanha", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_issue() {
        let state = test_state().await;
        let body = json!({ "issueKey": "2026-01", "weeks": [week_json("2026-01-05", "2026-01-11")] });
        send(&state, "POST", "/api/v1/mwb/ingest", Some(body)).await;

        let body = json!({ "action": "delete_issue", "issueKey": "2026-01" });
        let (status, response) = send(&state, "POST", "/api/v1/mwb/ingest", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["deleted"], 1);

        let (_, weeks) = send(&state, "GET", "/api/v1/mwb/weeks/2026-01", None).await;
        assert_eq!(weeks, json!([]));
    }

    #[tokio::test]
    async fn test_push_validation() {
        let state = test_state().await;

        let (status, response) =
            send(&state, "POST", "/api/v1/mwb/ingest", Some(json!({ "weeks": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "invalid payload");

        let (status, response) =
            send(&state, "POST", "/api/v1/mwb/ingest", Some(json!({ "issueKey": "2026-01" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "weeks_required");

        let (status, _) =
            send(&state, "POST", "/api/v1/mwb/ingest", Some(json!("not an object"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pull_reports_unreachable_source() {
        let state = test_state().await;
        let (status, summary) = send(
            &state,
            "GET",
            "/api/v1/mwb/ingest?mode=single&year=2026&month_start=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["mode"], "single");
        assert_eq!(summary["totalWeeks"], 0);
        assert_eq!(summary["issues"][0]["issueKey"], "2026-01");
        assert!(summary["issues"][0]["error"].is_string());

        let (status, _) =
            send(&state, "GET", "/api/v1/mwb/ingest?month_start=13", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pull_rejects_bad_backfill_range() {
        let state = test_state().await;
        for query in [
            "mode=backfill&start_year=2030&end_year=2020",
            "mode=backfill&start_year=-2000000&end_year=2026",
        ] {
            let uri = format!("/api/v1/mwb/ingest?{query}");
            let (status, response) = send(&state, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "bad_request");
        }
    }
}
