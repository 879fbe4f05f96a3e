use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::artifacts::read_json;
use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};

#[derive(Deserialize)]
struct EncoderJson {
    classes: Vec<String>,
}

/// Label encoder for location names. A label's code is its position in the
/// fitted class list.
#[derive(Debug, Clone)]
pub struct LocationEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LocationEncoder {
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let raw: EncoderJson = read_json(ArtifactKind::Encoder, path)?;
        Self::from_classes(raw.classes).map_err(|reason| ArtifactLoadError::Corrupt {
            kind: ArtifactKind::Encoder,
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_classes<I, S>(classes: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err("no classes".to_string());
        }
        let mut index = HashMap::with_capacity(classes.len());
        for (i, c) in classes.iter().enumerate() {
            if index.insert(c.clone(), i).is_some() {
                return Err(format!("duplicate class {:?}", c));
            }
        }
        Ok(Self { classes, index })
    }

    /// Known labels in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Result<usize, PredictError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| PredictError::UnknownLocation(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hyderabad() -> LocationEncoder {
        LocationEncoder::from_classes([
            "Banjara Hills",
            "Cyber Towers",
            "Gachibowli",
            "HITEC City",
        ])
        .unwrap()
    }

    #[test]
    fn test_transform_is_position() {
        let enc = hyderabad();
        assert_eq!(enc.transform("Banjara Hills"), Ok(0));
        assert_eq!(enc.transform("HITEC City"), Ok(3));
    }

    #[test]
    fn test_transform_is_stable() {
        let enc = hyderabad();
        let first = enc.transform("Gachibowli").unwrap();
        for _ in 0..10 {
            assert_eq!(enc.transform("Gachibowli").unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_label() {
        let enc = hyderabad();
        assert_eq!(
            enc.transform("Unknown Place"),
            Err(PredictError::UnknownLocation("Unknown Place".into()))
        );
        // labels are matched exactly
        assert!(enc.transform("hitec city").is_err());
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(LocationEncoder::from_classes(Vec::<String>::new()).is_err());
        let err = LocationEncoder::from_classes(["Madhapur", "Madhapur"]).unwrap_err();
        assert!(err.contains("Madhapur"));
    }
}
