//! Loading the fitted artifacts from disk, once.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::encoder::LocationEncoder;
use crate::error::{ArtifactKind, ArtifactLoadError};
use crate::model::{self, Regressor};
use crate::scaler::Scaler;
use crate::schema;

pub const MODEL_FILE: &str = "traffic_xgb_model.json";
pub const SCALER_FILE: &str = "traffic_scaler.json";
pub const ENCODER_FILE: &str = "location_encoder.json";
pub const META_FILE: &str = "meta.json";

pub(crate) fn read_json<T: DeserializeOwned>(
    kind: ArtifactKind,
    path: &Path,
) -> Result<T, ArtifactLoadError> {
    let txt = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactLoadError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ArtifactLoadError::Io {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&txt).map_err(|e| ArtifactLoadError::Corrupt {
        kind,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub encoder: PathBuf,
    pub meta: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Conventional file names inside `dir`. `meta.json` is only picked up
    /// when present.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let meta = dir.join(META_FILE);
        Self {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
            encoder: dir.join(ENCODER_FILE),
            meta: meta.exists().then_some(meta),
        }
    }
}

// ---------- meta.json ----------

#[derive(Deserialize)]
struct MetaJson {
    #[serde(default)]
    feat_list: Option<Vec<String>>,
    #[serde(default)]
    in_dim: Option<usize>,
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    rmse: Option<f64>,
    #[serde(default)]
    dataset_rows: Option<u64>,
    #[serde(default)]
    clusters: Option<u32>,
}

/// Descriptive facts about the fitted model, shown alongside predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCard {
    pub model_name: String,
    pub feature_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<u32>,
}

impl Default for ModelCard {
    fn default() -> Self {
        Self {
            model_name: "unnamed".to_string(),
            feature_count: schema::FEATURE_COUNT,
            rmse: None,
            dataset_rows: None,
            clusters: None,
        }
    }
}

fn load_meta(path: &Path) -> Result<ModelCard, ArtifactLoadError> {
    let meta: MetaJson = read_json(ArtifactKind::Meta, path)?;

    if let Some(names) = &meta.feat_list {
        schema::check_names(names).map_err(|d| ArtifactLoadError::schema(ArtifactKind::Meta, d))?;
    }
    if let Some(dim) = meta.in_dim {
        if dim != schema::FEATURE_COUNT {
            return Err(ArtifactLoadError::schema(
                ArtifactKind::Meta,
                format!("in_dim {} != {}", dim, schema::FEATURE_COUNT),
            ));
        }
    }

    let mut card = ModelCard::default();
    if let Some(name) = meta.model_name {
        card.model_name = name;
    }
    card.rmse = meta.rmse;
    card.dataset_rows = meta.dataset_rows;
    card.clusters = meta.clusters;
    Ok(card)
}

// ---------- Artifacts ----------

/// The fitted model, scaler and encoder. Never mutated after construction.
pub struct Artifacts {
    model: Box<dyn Regressor>,
    scaler: Scaler,
    encoder: LocationEncoder,
    card: ModelCard,
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        tracing::info!("loading encoder from {}", paths.encoder.display());
        let encoder = LocationEncoder::load(&paths.encoder)?;
        tracing::info!("loading scaler from {}", paths.scaler.display());
        let scaler = Scaler::load(&paths.scaler)?;
        tracing::info!("loading model from {}", paths.model.display());
        let model = model::load(&paths.model)?;

        let card = match &paths.meta {
            Some(p) => load_meta(p)?,
            None => {
                tracing::warn!("no meta file; schema checked by width only");
                ModelCard::default()
            }
        };

        Self::from_parts(model, scaler, encoder, card)
    }

    /// Assembles artifacts built elsewhere (tests, alternative loaders).
    /// Scaler parameters are checked for consistency and, like the model,
    /// against the feature schema.
    pub fn from_parts(
        model: Box<dyn Regressor>,
        scaler: Scaler,
        encoder: LocationEncoder,
        card: ModelCard,
    ) -> Result<Self, ArtifactLoadError> {
        scaler.check_schema()?;
        model::check_schema(model.as_ref())?;
        Ok(Self {
            model,
            scaler,
            encoder,
            card,
        })
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &LocationEncoder {
        &self.encoder
    }

    pub fn card(&self) -> &ModelCard {
        &self.card
    }
}

/// Load-once holder. Concurrent callers wait on the first load; a failed load
/// is not remembered, so a later call tries again.
pub struct ArtifactCache {
    paths: ArtifactPaths,
    slot: Mutex<Option<Arc<Artifacts>>>,
}

impl ArtifactCache {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<Artifacts>, ArtifactLoadError> {
        let mut slot = self.slot.lock();
        if let Some(a) = slot.as_ref() {
            return Ok(Arc::clone(a));
        }
        let loaded = Arc::new(Artifacts::load(&self.paths)?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}
