use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;
use super::response::ApiResponse;
use crate::controller::AppState;
use crate::domain::area::Area;
use crate::domain::prediction::ForecastPoint;

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub country_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionsBody {
    pub country: String,
    pub predictions: Vec<ForecastPoint>,
}

/// `POST /get_predictions` with `{"country_code": "DE"}`.
pub async fn get_predictions(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PredictionsBody>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let code = request
        .country_code
        .ok_or_else(|| ApiError::BadRequest("Missing 'country_code' in request".to_string()))?;
    // only known areas reach the file system
    let country = Area::from_country(&code)?.country.to_string();

    let store = state.store.clone();
    let lookup = country.clone();
    let predictions = tokio::task::spawn_blocking(move || store.load(&lookup))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))??;
    if predictions.is_empty() {
        return Err(ApiError::NotFound(format!("predictions for {country}")));
    }

    debug!(%country, count = predictions.len(), "serving predictions");
    let count = predictions.len();
    Ok(Json(
        ApiResponse::success(PredictionsBody {
            country,
            predictions,
        })
        .with_count(count),
    ))
}
