use std::path::Path;

use serde::Deserialize;

use crate::artifacts::read_json;
use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};
use crate::schema;

/// Per-column affine normalisation with parameters fixed at fit time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scaler {
    /// `(x - mean) / scale`. Missing `mean` means the scaler was fit without
    /// centering.
    Standard {
        #[serde(default)]
        mean: Option<Vec<f64>>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
    },
    /// `x * scale + min`
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
    },
}

impl Scaler {
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let scaler: Scaler = read_json(ArtifactKind::Scaler, path)?;
        scaler.validate().map_err(|reason| ArtifactLoadError::Corrupt {
            kind: ArtifactKind::Scaler,
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(scaler)
    }

    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Scaler::Standard {
            mean: Some(mean),
            scale,
            feature_names_in: None,
        }
    }

    /// Number of columns the scaler was fit on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Scaler::Standard {
                feature_names_in, ..
            }
            | Scaler::MinMax {
                feature_names_in, ..
            } => feature_names_in.as_deref(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let (offsets, scale) = match self {
            Scaler::Standard { mean, scale, .. } => (mean.as_ref(), scale),
            Scaler::MinMax { min, scale, .. } => (Some(min), scale),
        };
        if let Some(o) = offsets {
            if o.len() != scale.len() {
                return Err(format!(
                    "offset has {} columns but scale has {}",
                    o.len(),
                    scale.len()
                ));
            }
        }
        if scale.iter().chain(offsets.into_iter().flatten()).any(|v| !v.is_finite()) {
            return Err("non-finite parameter".to_string());
        }
        Ok(())
    }

    /// Checks parameter consistency, then the fitted width (and names, when
    /// recorded) against the schema.
    pub fn check_schema(&self) -> Result<(), ArtifactLoadError> {
        self.validate()
            .map_err(|d| ArtifactLoadError::schema(ArtifactKind::Scaler, d))?;
        if self.n_features() != schema::FEATURE_COUNT {
            return Err(ArtifactLoadError::schema(
                ArtifactKind::Scaler,
                format!(
                    "fit on {} features, schema has {}",
                    self.n_features(),
                    schema::FEATURE_COUNT
                ),
            ));
        }
        if let Some(names) = self.feature_names() {
            schema::check_names(names)
                .map_err(|d| ArtifactLoadError::schema(ArtifactKind::Scaler, d))?;
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        if row.len() != self.n_features() {
            return Err(PredictError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features(),
                got: row.len(),
            });
        }
        let out = match self {
            Scaler::Standard { mean, scale, .. } => row
                .iter()
                .enumerate()
                .map(|(i, x)| {
                    let centered = mean.as_ref().map_or(*x, |m| x - m[i]);
                    // zero variance columns pass through unscaled
                    let s = if scale[i] == 0.0 { 1.0 } else { scale[i] };
                    centered / s
                })
                .collect(),
            Scaler::MinMax { min, scale, .. } => row
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        Ok(out)
    }

    /// Transforms an `(n_samples, n_features)` batch.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PredictError> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}
