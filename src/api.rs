//! HTTP surface consumed by the dashboard.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::PredictError;
use crate::features::TrafficQuery;
use crate::hotspots::MapView;
use crate::pipeline::{feature_digest, Predictor};
use crate::schema::{SchemaInfo, SCHEMA_VERSION};
use crate::types::{HealthOut, LocationsOut, ModelOut, PredictionOut};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub log_features: bool,
}

// ---------- Errors ----------

#[derive(Debug)]
pub struct ApiError(PredictError);

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PredictError::UnknownLocation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictError::InvalidHour(_) => StatusCode::BAD_REQUEST,
            PredictError::ShapeMismatch { .. } | PredictError::Backend(_) => {
                tracing::error!("inference failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

// ---------- Handlers ----------

async fn health() -> Json<HealthOut> {
    Json(HealthOut {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        schema_version: SCHEMA_VERSION,
    })
}

async fn locations(State(state): State<AppState>) -> Response {
    let body = Json(LocationsOut {
        locations: state.predictor.locations(),
    })
    .into_response();
    body
}

async fn schema() -> Json<SchemaInfo> {
    Json(SchemaInfo::current())
}

async fn predict(
    State(state): State<AppState>,
    Json(query): Json<TrafficQuery>,
) -> Result<Json<PredictionOut>, ApiError> {
    let prediction = state.predictor.predict(&query)?;

    if state.log_features {
        tracing::info!(
            "recv location={:?} hour={} {}",
            prediction.location,
            prediction.hour,
            feature_digest(&prediction.features)
        );
    }

    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    Ok(Json(PredictionOut { t, prediction }))
}

async fn map() -> Json<MapView> {
    Json(MapView::hyderabad())
}

async fn model(State(state): State<AppState>) -> Response {
    let artifacts = state.predictor.artifacts();
    let body = Json(ModelOut {
        card: artifacts.card(),
        model: artifacts.model().describe(),
    })
    .into_response();
    body
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/locations", get(locations))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/map", get(map))
        .route("/api/v1/model", get(model))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
