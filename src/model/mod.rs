//! Regression models behind a common batch-predict interface.

use std::path::Path;

use serde::Serialize;

use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};
use crate::schema;

pub mod xgb;
#[cfg(feature = "torch")]
pub mod torch;

pub use xgb::TreeEnsemble;

/// A fitted regressor. Implementations are immutable after load and must be
/// deterministic.
pub trait Regressor: Send + Sync {
    /// Input width the model was fit on.
    fn n_features(&self) -> usize;

    /// Predicts one value per row of an `(n_samples, n_features)` batch.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError>;

    fn describe(&self) -> ModelInfo;

    /// Feature names recorded in the artifact, if any.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub kind: &'static str,
    pub n_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_trees: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// Picks a loader from the file extension.
pub fn load(path: &Path) -> Result<Box<dyn Regressor>, ArtifactLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => Ok(Box::new(TreeEnsemble::load(path)?)),
        #[cfg(feature = "torch")]
        Some("pt") | Some("ts") => Ok(Box::new(torch::TorchRegressor::load(
            path,
            schema::FEATURE_COUNT,
        )?)),
        _ => Err(ArtifactLoadError::Unsupported {
            kind: ArtifactKind::Model,
            path: path.to_path_buf(),
        }),
    }
}

/// Verifies input width (and names, when recorded) against the schema.
pub fn check_schema(model: &dyn Regressor) -> Result<(), ArtifactLoadError> {
    if model.n_features() != schema::FEATURE_COUNT {
        return Err(ArtifactLoadError::schema(
            ArtifactKind::Model,
            format!(
                "expects {} features, schema has {}",
                model.n_features(),
                schema::FEATURE_COUNT
            ),
        ));
    }
    if let Some(names) = model.feature_names() {
        schema::check_names(names)
            .map_err(|d| ArtifactLoadError::schema(ArtifactKind::Model, d))?;
    }
    Ok(())
}

pub(crate) fn check_rows(rows: &[Vec<f64>], n_features: usize) -> Result<(), PredictError> {
    match rows.iter().find(|r| r.len() != n_features) {
        Some(bad) => Err(PredictError::ShapeMismatch {
            stage: "model input",
            expected: n_features,
            got: bad.len(),
        }),
        None => Ok(()),
    }
}
