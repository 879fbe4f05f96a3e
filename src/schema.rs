//! Feature schema shared by the scaler, the model and the assembler.
//!
//! The three artifacts were fit against this exact column order. Any change to
//! the list (add, remove, reorder) must bump `SCHEMA_VERSION`.

use serde::Serialize;

pub const SCHEMA_VERSION: u32 = 1;

/// Column order the artifacts were fit on.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] = [
    "hour",                  // 0
    "day_of_week",           // 1
    "month",                 // 2
    "is_rush_hour",          // 3
    "is_weekend",            // 4
    "heavy_rain",            // 5
    "hot_weather",           // 6
    "speed_ratio",           // 7
    "location_encoded",      // 8
    "rush_rain_interaction", // 9
    "volume_per_speed",      // 10
    "metro_nearby",          // 11
    "accidents_count",       // 12
    "volume_3h_avg",         // 13
];

pub const FEATURE_COUNT: usize = 14;

/// Hours counted as evening rush.
pub const RUSH_HOURS: [u8; 3] = [17, 18, 19];

// ---------- Placeholder constants ----------
// Not sourced from any live signal; the model still expects a value.

pub const DAY_OF_WEEK: f64 = 1.0;
pub const MONTH: f64 = 6.0;
pub const IS_WEEKEND: f64 = 0.0;
pub const HOT_WEATHER: f64 = 0.0;
pub const SPEED_RATIO: f64 = 2000.0;
pub const VOLUME_PER_SPEED: f64 = 2000.0;
pub const METRO_NEARBY: f64 = 0.0;
pub const VOLUME_3H_AVG: f64 = 2500.0;

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|&n| n == name)
}

/// Compares an artifact's declared feature names with the schema.
///
/// Returns a human-readable description of the first disagreement.
pub fn check_names<S: AsRef<str>>(names: &[S]) -> Result<(), String> {
    if names.len() != FEATURE_COUNT {
        return Err(format!(
            "declares {} features, schema has {}",
            names.len(),
            FEATURE_COUNT
        ));
    }
    for (i, (got, want)) in names.iter().zip(FEATURE_SCHEMA.iter()).enumerate() {
        if got.as_ref() != *want {
            return Err(format!(
                "column {} is {:?}, schema expects {:?}",
                i,
                got.as_ref(),
                want
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub version: u32,
    pub feature_count: usize,
    pub features: Vec<&'static str>,
}

impl SchemaInfo {
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            feature_count: FEATURE_COUNT,
            features: FEATURE_SCHEMA.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_len_matches_count() {
        assert_eq!(FEATURE_SCHEMA.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("hour"), Some(0));
        assert_eq!(feature_index("location_encoded"), Some(8));
        assert_eq!(feature_index("volume_3h_avg"), Some(13));
        assert_eq!(feature_index("congestion"), None);
    }

    #[test]
    fn test_check_names_accepts_schema() {
        assert!(check_names(&FEATURE_SCHEMA).is_ok());
    }

    #[test]
    fn test_check_names_rejects_reorder() {
        let mut names = FEATURE_SCHEMA.to_vec();
        names.swap(0, 1);
        let err = check_names(&names).unwrap_err();
        assert!(err.contains("column 0"), "unexpected message: {}", err);
    }

    #[test]
    fn test_check_names_rejects_short_list() {
        let names = &FEATURE_SCHEMA[..13];
        assert!(check_names(names).is_err());
    }
}
