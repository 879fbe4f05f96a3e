//! Query → features → scaled row → score → status.

use std::sync::Arc;

use serde::Serialize;

use crate::artifacts::Artifacts;
use crate::error::PredictError;
use crate::features::{self, FeatureVector, TrafficQuery};
use crate::schema;
use crate::status::Status;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub location: String,
    pub hour: u8,
    pub score: f64,
    pub status: Status,
    pub badge: &'static str,
    pub summary: String,
    pub features: FeatureVector,
}

/// Immutable prediction context handed to every request handler.
#[derive(Clone)]
pub struct Predictor {
    artifacts: Arc<Artifacts>,
}

impl Predictor {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn locations(&self) -> &[String] {
        self.artifacts.encoder().classes()
    }

    pub fn assemble(&self, query: &TrafficQuery) -> Result<FeatureVector, PredictError> {
        features::assemble(query, self.artifacts.encoder())
    }

    /// Scales one vector and runs the model on it.
    pub fn score(&self, fv: &FeatureVector) -> Result<f64, PredictError> {
        let scaled = self.artifacts.scaler().transform(&[fv.values().to_vec()])?;
        let out = self.artifacts.model().predict(&scaled)?;
        match out.as_slice() {
            [score] => Ok(*score),
            other => Err(PredictError::ShapeMismatch {
                stage: "model output",
                expected: 1,
                got: other.len(),
            }),
        }
    }

    pub fn predict(&self, query: &TrafficQuery) -> Result<Prediction, PredictError> {
        let fv = self.assemble(query)?;
        let score = self.score(&fv)?;
        let status = Status::classify(score);
        tracing::debug!(
            "predict location={:?} hour={} score={:.3} status={}",
            query.location,
            query.hour,
            score,
            status
        );
        Ok(Prediction {
            summary: format!(
                "{} at {}:00 → {} ({:.2})",
                query.location, query.hour, status, score
            ),
            location: query.location.clone(),
            hour: query.hour,
            score,
            status,
            badge: status.badge(),
            features: fv,
        })
    }
}

/// One-line digest of a feature vector for debug logging.
pub fn feature_digest(fv: &FeatureVector) -> String {
    let v = fv.values();
    let n = v.len() as f64;
    let nz = v.iter().filter(|x| **x != 0.0).count();
    let mean = v.iter().sum::<f64>() / n;
    let std = (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n).sqrt();
    let sample: Vec<String> = fv
        .named()
        .take(6)
        .map(|(name, x)| format!("{}={:.3}", name, x))
        .collect();
    format!(
        "in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        schema::FEATURE_COUNT,
        nz,
        mean,
        std,
        sample.join(", ")
    )
}
