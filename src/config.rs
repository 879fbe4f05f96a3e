//! Runtime configuration from environment variables.

use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use crate::artifacts::{ArtifactPaths, ENCODER_FILE, META_FILE, MODEL_FILE, SCALER_FILE};

#[derive(Debug, Clone)]
pub struct Config {
    pub artifacts: ArtifactPaths,
    pub host: IpAddr,
    pub port: u16,
    /// Log a digest of every assembled feature vector.
    pub log_features: bool,
}

impl Config {
    /// Reads the process environment (after an optional `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|k| env::var(k).ok())
    }

    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = PathBuf::from(var("ARTIFACT_DIR").unwrap_or_else(|| "artifacts".to_string()));
        let path = |key: &str, file: &str| {
            var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| dir.join(file))
        };

        // An explicit META_PATH must exist; the default one is optional.
        let meta = match var("META_PATH") {
            Some(p) => Some(PathBuf::from(p)),
            None => {
                let p = dir.join(META_FILE);
                p.exists().then_some(p)
            }
        };

        Self {
            artifacts: ArtifactPaths {
                model: path("MODEL_PATH", MODEL_FILE),
                scaler: path("SCALER_PATH", SCALER_FILE),
                encoder: path("ENCODER_PATH", ENCODER_FILE),
                meta,
            },
            host: var("BIND_ADDR")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: var("PORT").and_then(|s| s.parse().ok()).unwrap_or(8080),
            log_features: var("LOG_PRED").as_deref() == Some("1"),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
