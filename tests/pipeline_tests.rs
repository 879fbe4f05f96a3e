/// End-to-end checks against the sample artifacts in `artifacts/`.
///
/// Run with: cargo test --test pipeline_tests -- --nocapture
use std::{path::PathBuf, sync::Arc};

use traffic_predictor::{
    ArtifactPaths, Artifacts, PredictError, Predictor, Status, TrafficQuery,
};

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

fn predictor() -> Predictor {
    let artifacts =
        Artifacts::load(&ArtifactPaths::in_dir(sample_dir())).expect("sample artifacts load");
    Predictor::new(Arc::new(artifacts))
}

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-4, "score {} != {}", got, want);
}

#[test]
fn test_scenario_rush_hour_rain() {
    let p = predictor();
    let out = p
        .predict(&TrafficQuery::new(18, "Banjara Hills", true, false))
        .unwrap();

    assert_eq!(out.features.is_rush_hour, 1.0);
    assert_eq!(out.features.rush_rain_interaction, 1.0);
    assert_eq!(out.features.heavy_rain, 1.0);
    assert_eq!(out.features.accidents_count, 0.0);
    assert_eq!(out.features.location_encoded, 0.0);

    assert_close(out.score, 2.6);
    assert_eq!(out.status, Status::Jam);
    println!("✓ {}", out.summary);
}

#[test]
fn test_scenario_night_dry() {
    let p = predictor();
    let out = p
        .predict(&TrafficQuery::new(3, "Gachibowli", false, false))
        .unwrap();

    assert_eq!(out.features.is_rush_hour, 0.0);
    assert_eq!(out.features.rush_rain_interaction, 0.0);
    assert_close(out.score, 0.75);
    assert_eq!(out.status, Status::Clear);
}

#[test]
fn test_scenario_unknown_location() {
    let p = predictor();
    let err = p
        .predict(&TrafficQuery::new(12, "Unknown Place", false, false))
        .unwrap_err();
    assert_eq!(err, PredictError::UnknownLocation("Unknown Place".to_string()));
}

#[test]
fn test_moderate_bands() {
    let p = predictor();
    let cases = [
        (TrafficQuery::new(18, "HITEC City", false, false), 2.2),
        (TrafficQuery::new(9, "Madhapur", false, true), 1.8),
        (TrafficQuery::new(10, "Raidurg", true, false), 1.65),
    ];
    for (q, want) in cases {
        let out = p.predict(&q).unwrap();
        assert_close(out.score, want);
        assert_eq!(out.status, Status::Moderate, "{}", out.summary);
    }
}

#[test]
fn test_idempotent() {
    let p = predictor();
    let q = TrafficQuery::new(19, "Jubilee Hills", true, true);
    let a = p.predict(&q).unwrap();
    let b = p.predict(&q).unwrap();
    assert_eq!(a.score.to_bits(), b.score.to_bits());
    assert_eq!(a.status, b.status);
    assert_eq!(a, b);
}

#[test]
fn test_every_location_scores() {
    let p = predictor();
    let locations = p.locations().to_vec();
    assert_eq!(locations.len(), 7);
    for (i, loc) in locations.iter().enumerate() {
        for hour in 0..=23u8 {
            let out = p.predict(&TrafficQuery::new(hour, loc.clone(), false, false)).unwrap();
            assert_eq!(out.features.location_encoded, i as f64);
            assert!(out.score.is_finite());
            assert_eq!(out.status, Status::classify(out.score));
        }
    }
}

#[test]
fn test_model_card_from_meta() {
    let p = predictor();
    let card = p.artifacts().card();
    assert_eq!(card.model_name, "XGBoost");
    assert_eq!(card.rmse, Some(0.83));
    assert_eq!(card.dataset_rows, Some(50_000));
    assert_eq!(card.clusters, Some(3));

    let info = p.artifacts().model().describe();
    assert_eq!(info.kind, "xgboost");
    assert_eq!(info.n_trees, Some(5));
    assert_eq!(info.n_features, 14);
}
