//! Congestion score predictor for a fixed set of Hyderabad locations.
//!
//! A query (hour, location, rain, accident) is turned into the 14-column
//! feature vector the artifacts were fit on, scaled, scored by the regression
//! model and bucketed into `CLEAR` / `MODERATE` / `JAM`.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod hotspots;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod schema;
pub mod status;
pub mod types;

pub use artifacts::{ArtifactCache, ArtifactPaths, Artifacts, ModelCard};
pub use error::{ArtifactKind, ArtifactLoadError, PredictError};
pub use features::{FeatureVector, TrafficQuery};
pub use pipeline::{Prediction, Predictor};
pub use status::Status;
