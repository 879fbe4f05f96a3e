//! TorchScript regressors (`--features torch`).

use std::path::Path;

use tch::{kind::Kind, CModule, Device, Tensor};

use super::{check_rows, ModelInfo, Regressor};
use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};

pub struct TorchRegressor {
    module: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchRegressor {
    pub fn load(path: &Path, in_dim: usize) -> Result<Self, ArtifactLoadError> {
        if !path.exists() {
            return Err(ArtifactLoadError::Missing {
                kind: ArtifactKind::Model,
                path: path.to_path_buf(),
            });
        }
        let corrupt = |reason: String| ArtifactLoadError::Corrupt {
            kind: ArtifactKind::Model,
            path: path.to_path_buf(),
            reason,
        };

        let device = Device::Cpu;
        let module = CModule::load_on_device(path, device)
            .map_err(|e| corrupt(format!("failed to load TorchScript: {}", e)))?;

        // Probe with a dummy batch of one; expect exactly one output value
        let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
        let out = module
            .forward_ts(&[dummy])
            .map_err(|e| corrupt(format!("probe forward failed: {}", e)))?;
        if out.numel() != 1 {
            return Err(corrupt(format!("unexpected model output size: {:?}", out.size())));
        }

        Ok(Self {
            module,
            device,
            in_dim,
        })
    }
}

impl Regressor for TorchRegressor {
    fn n_features(&self) -> usize {
        self.in_dim
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        check_rows(rows, self.in_dim)?;
        let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&flat)
            .reshape([rows.len() as i64, self.in_dim as i64])
            .to_device(self.device);

        let out = self
            .module
            .forward_ts(&[input])
            .map_err(|e| PredictError::Backend(e.to_string()))?
            .to_kind(Kind::Float)
            .flatten(0, -1);
        let values = Vec::<f32>::try_from(&out).map_err(|e| PredictError::Backend(e.to_string()))?;
        if values.len() != rows.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "model output",
                expected: rows.len(),
                got: values.len(),
            });
        }
        Ok(values.into_iter().map(f64::from).collect())
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            kind: "torchscript",
            n_features: self.in_dim,
            n_trees: None,
            objective: None,
        }
    }
}
