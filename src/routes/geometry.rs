//! Map path erasing route

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::geometry::{erase_optional, EraseRegion, Polyline};
use crate::state::AppState;

/// Create the geometry router
pub fn router() -> Router<AppState> {
    Router::new().route("/erase", post(erase))
}

#[derive(Debug, Deserialize)]
pub struct EraseRequest {
    #[serde(flatten)]
    pub region: EraseRegion,
    #[serde(default, deserialize_with = "lenient_polylines")]
    pub polylines: Option<Vec<Polyline>>,
}

/// Anything other than a list of paths reads as no paths
fn lenient_polylines<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Polyline>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .filter(serde_json::Value::is_array)
        .and_then(|list| serde_json::from_value(list).ok()))
}

#[derive(Debug, Serialize)]
pub struct EraseResponse {
    pub polylines: Vec<Polyline>,
}

/// Cut a circle out of drawn paths
async fn erase(Json(request): Json<EraseRequest>) -> Result<Json<EraseResponse>> {
    let polylines = erase_optional(&request.region, request.polylines.as_deref());
    Ok(Json(EraseResponse { polylines }))
}
