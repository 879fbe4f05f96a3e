//! Gradient-boosted tree ensembles exported with XGBoost's `save_model` JSON.
//!
//! Only what prediction needs is read: the per-tree node arrays, the base
//! score and the objective's link function. Inputs are evaluated as `f32`
//! like the native library does, so thresholds compare bit-for-bit.

use std::path::Path;

use serde::Deserialize;

use super::{check_rows, ModelInfo, Regressor};
use crate::artifacts::read_json;
use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};

// ---------- On-disk layout ----------

#[derive(Deserialize)]
struct ModelJson {
    learner: LearnerJson,
}

#[derive(Deserialize)]
struct LearnerJson {
    #[serde(default)]
    feature_names: Vec<String>,
    learner_model_param: LearnerParamJson,
    gradient_booster: BoosterJson,
    objective: ObjectiveJson,
}

#[derive(Deserialize)]
struct LearnerParamJson {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Deserialize)]
struct BoosterJson {
    name: String,
    #[serde(default)]
    model: Option<TreesJson>,
}

#[derive(Deserialize)]
struct TreesJson {
    trees: Vec<TreeJson>,
}

#[derive(Deserialize)]
struct ObjectiveJson {
    name: String,
}

#[derive(Deserialize)]
struct TreeJson {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<u8>,
}

// Older exports write 0/1, newer ones write booleans.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

// ---------- Evaluation ----------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Link {
    Identity,
    Logistic,
    Exp,
}

impl Link {
    fn for_objective(name: &str) -> Option<Self> {
        match name {
            "reg:squarederror" | "reg:linear" | "reg:absoluteerror" | "reg:pseudohubererror"
            | "reg:squaredlogerror" => Some(Link::Identity),
            "reg:logistic" | "binary:logistic" => Some(Link::Logistic),
            "count:poisson" | "reg:gamma" | "reg:tweedie" => Some(Link::Exp),
            _ => None,
        }
    }

    /// base_score is stored in output space; trees add in margin space.
    fn base_margin(self, base_score: f32) -> Result<f32, String> {
        match self {
            Link::Identity => Ok(base_score),
            Link::Logistic if base_score > 0.0 && base_score < 1.0 => {
                Ok((base_score / (1.0 - base_score)).ln())
            }
            Link::Exp if base_score > 0.0 => Ok(base_score.ln()),
            _ => Err(format!("base_score {} invalid for objective link", base_score)),
        }
    }

    fn apply(self, margin: f32) -> f32 {
        match self {
            Link::Identity => margin,
            Link::Logistic => 1.0 / (1.0 + (-margin).exp()),
            Link::Exp => margin.exp(),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    left: i32,
    right: i32,
    feature: u32,
    // split threshold, or the leaf value when `left == -1`
    value: f32,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_json(t: TreeJson, n_features: usize) -> Result<Self, String> {
        let n = t.left_children.len();
        if n == 0 {
            return Err("empty tree".to_string());
        }
        if t.right_children.len() != n
            || t.split_indices.len() != n
            || t.split_conditions.len() != n
            || t.default_left.len() != n
        {
            return Err("node arrays have different lengths".to_string());
        }
        if t.split_type.iter().any(|&s| s != 0) {
            return Err("categorical splits are not supported".to_string());
        }

        let mut nodes = Vec::with_capacity(n);
        for nid in 0..n {
            let (left, right) = (t.left_children[nid], t.right_children[nid]);
            let is_leaf = left == -1;
            if is_leaf != (right == -1) {
                return Err(format!("node {} has a single child", nid));
            }
            if !is_leaf {
                // children always come after their parent; rules out cycles
                for c in [left, right] {
                    if c as usize <= nid || c as usize >= n || c < 0 {
                        return Err(format!("node {} has out of range child {}", nid, c));
                    }
                }
                if t.split_indices[nid] as usize >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        nid, t.split_indices[nid], n_features
                    ));
                }
            }
            nodes.push(Node {
                left,
                right,
                feature: t.split_indices[nid],
                value: t.split_conditions[nid],
                default_left: t.default_left[nid].is_set(),
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, row: &[f32]) -> f32 {
        let mut nid = 0usize;
        loop {
            let node = &self.nodes[nid];
            if node.left == -1 {
                return node.value;
            }
            let x = row[node.feature as usize];
            let go_left = if x.is_nan() {
                node.default_left
            } else {
                x < node.value
            };
            nid = if go_left { node.left } else { node.right } as usize;
        }
    }
}

/// Additive tree ensemble: `link(base_margin + Σ leaf)`.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    base_margin: f32,
    link: Link,
    n_features: usize,
    objective: String,
    feature_names: Option<Vec<String>>,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let raw: ModelJson = read_json(ArtifactKind::Model, path)?;
        Self::from_raw(raw).map_err(|reason| ArtifactLoadError::Corrupt {
            kind: ArtifactKind::Model,
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, String> {
        let raw: ModelJson = serde_json::from_str(s).map_err(|e| e.to_string())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: ModelJson) -> Result<Self, String> {
        let learner = raw.learner;
        let param = learner.learner_model_param;

        let n_features: usize = param
            .num_feature
            .trim()
            .parse()
            .map_err(|_| format!("bad num_feature {:?}", param.num_feature))?;
        if let Some(t) = param.num_target.as_deref() {
            if t.trim() != "1" {
                return Err(format!("multi-target models are not supported (num_target={})", t));
            }
        }
        let base_score = parse_base_score(&param.base_score)?;

        let objective = learner.objective.name;
        let link = Link::for_objective(&objective)
            .ok_or_else(|| format!("unsupported objective {:?}", objective))?;
        let base_margin = link.base_margin(base_score)?;

        if learner.gradient_booster.name != "gbtree" {
            return Err(format!(
                "unsupported booster {:?}",
                learner.gradient_booster.name
            ));
        }
        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| "gbtree booster has no model".to_string())?;
        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::from_json(t, n_features).map_err(|e| format!("tree {}: {}", i, e)))
            .collect::<Result<Vec<_>, _>>()?;

        let feature_names = if learner.feature_names.is_empty() {
            None
        } else {
            Some(learner.feature_names)
        };

        Ok(Self {
            trees,
            base_margin,
            link,
            n_features,
            objective,
            feature_names,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let x: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, t| acc + t.leaf_value(&x));
        self.link.apply(margin) as f64
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        check_rows(rows, self.n_features)?;
        Ok(rows.iter().map(|r| self.predict_row(r)).collect())
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            kind: "xgboost",
            n_features: self.n_features,
            n_trees: Some(self.trees.len()),
            objective: Some(self.objective.clone()),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}

// "5E-1" (1.x) or "[5E-1]" (newer releases)
fn parse_base_score(s: &str) -> Result<f32, String> {
    let t = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
    t.parse::<f32>()
        .map_err(|_| format!("bad base_score {:?}", s))
}
