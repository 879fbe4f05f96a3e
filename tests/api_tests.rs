/// Router tests driven through `tower::ServiceExt::oneshot`.
use std::{path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use traffic_predictor::{
    api::{router, AppState},
    encoder::LocationEncoder,
    model::{ModelInfo, Regressor},
    scaler::Scaler,
    schema::FEATURE_COUNT,
    ArtifactPaths, Artifacts, ModelCard, PredictError, Predictor,
};

fn app() -> Router {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    let artifacts = Artifacts::load(&ArtifactPaths::in_dir(dir)).expect("sample artifacts load");
    router(AppState {
        predictor: Predictor::new(Arc::new(artifacts)),
        log_features: true,
    })
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let res = app().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_predict(body: Value) -> (StatusCode, Value) {
    send(
        Request::post("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["schema_version"], 1);
}

#[tokio::test]
async fn test_locations_in_encoder_order() {
    let (status, body) = get("/api/v1/locations").await;
    assert_eq!(status, StatusCode::OK);
    let locs = body["locations"].as_array().unwrap();
    assert_eq!(locs.len(), 7);
    assert_eq!(locs[0], "Banjara Hills");
    assert_eq!(locs[6], "Raidurg");
}

#[tokio::test]
async fn test_schema() {
    let (_, body) = get("/api/v1/schema").await;
    assert_eq!(body["feature_count"], 14);
    assert_eq!(body["features"][0], "hour");
    assert_eq!(body["features"][13], "volume_3h_avg");
}

#[tokio::test]
async fn test_predict_ok() {
    let (status, body) = post_predict(json!({
        "hour": 18,
        "location": "Banjara Hills",
        "heavy_rain": true,
        "accident": false
    }))
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], "JAM");
    assert_eq!(body["badge"], "🔴 JAM");
    assert_eq!(body["summary"], "Banjara Hills at 18:00 → JAM (2.60)");
    assert_eq!(body["features"]["rush_rain_interaction"], 1.0);
    assert!(body["t"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_predict_toggles_optional() {
    let (status, body) = post_predict(json!({ "hour": 3, "location": "Gachibowli" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CLEAR");
}

#[tokio::test]
async fn test_predict_unknown_location() {
    let (status, body) = post_predict(json!({ "hour": 3, "location": "Unknown Place" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert!(body["error"].as_str().unwrap().contains("Unknown Place"));
}

#[tokio::test]
async fn test_predict_bad_hour() {
    let (status, body) = post_predict(json!({ "hour": 24, "location": "Gachibowli" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_malformed_body_rejected() {
    let (status, _) = post_predict(json!({ "hour": -1, "location": "Gachibowli" })).await;
    assert!(status.is_client_error(), "got {}", status);
}

#[tokio::test]
async fn test_map_is_static_sample() {
    let (status, body) = get("/api/v1/map").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["static_sample"], true);
    assert_eq!(body["center"]["lat"], 17.385);
    assert_eq!(body["hotspots"].as_array().unwrap().len(), 7);
    assert_eq!(body["hotspots"][0]["location"], "HITEC City");
}

#[tokio::test]
async fn test_model_card() {
    let (status, body) = get("/api/v1/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_name"], "XGBoost");
    assert_eq!(body["rmse"], 0.83);
    assert_eq!(body["feature_count"], 14);
    assert_eq!(body["model"]["kind"], "xgboost");
    assert_eq!(body["model"]["n_trees"], 5);
}

/// Backend that fails every call, as a crashed native runtime would.
struct FailingModel;

impl Regressor for FailingModel {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        Err(PredictError::Backend("session closed".into()))
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            kind: "failing",
            n_features: FEATURE_COUNT,
            n_trees: None,
            objective: None,
        }
    }
}

#[tokio::test]
async fn test_backend_failure_is_500_and_server_keeps_serving() {
    let artifacts = Artifacts::from_parts(
        Box::new(FailingModel),
        Scaler::standard(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]),
        LocationEncoder::from_classes(["Gachibowli"]).unwrap(),
        ModelCard::default(),
    )
    .unwrap();
    let app = router(AppState {
        predictor: Predictor::new(Arc::new(artifacts)),
        log_features: true,
    });

    let req = Request::post("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "hour": 9, "location": "Gachibowli" }).to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().contains("session closed"), "body: {}", body);

    // same router still answers afterwards
    let req = Request::get("/api/v1/locations").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
