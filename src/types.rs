use serde::Serialize;

use crate::artifacts::ModelCard;
use crate::model::ModelInfo;
use crate::pipeline::Prediction;

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub version: &'static str,
    pub schema_version: u32,
}

#[derive(Debug, Serialize)]
pub struct LocationsOut<'a> {
    pub locations: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct PredictionOut {
    /// Milliseconds since the Unix epoch.
    pub t: i64,
    #[serde(flatten)]
    pub prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct ModelOut<'a> {
    #[serde(flatten)]
    pub card: &'a ModelCard,
    pub model: ModelInfo,
}
