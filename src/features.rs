use serde::{Deserialize, Serialize};

use crate::encoder::LocationEncoder;
use crate::error::PredictError;
use crate::schema::{self, FEATURE_COUNT, RUSH_HOURS};

/// User-facing inputs for one prediction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrafficQuery {
    pub hour: u8,
    pub location: String,
    #[serde(default)]
    pub heavy_rain: bool,
    #[serde(default)]
    pub accident: bool,
}

impl TrafficQuery {
    pub fn new(hour: u8, location: impl Into<String>, heavy_rain: bool, accident: bool) -> Self {
        Self {
            hour,
            location: location.into(),
            heavy_rain,
            accident,
        }
    }
}

/// The model input, one named field per schema column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub hour: f64,
    pub day_of_week: f64,
    pub month: f64,
    pub is_rush_hour: f64,
    pub is_weekend: f64,
    pub heavy_rain: f64,
    pub hot_weather: f64,
    pub speed_ratio: f64,
    pub location_encoded: f64,
    pub rush_rain_interaction: f64,
    pub volume_per_speed: f64,
    pub metro_nearby: f64,
    pub accidents_count: f64,
    pub volume_3h_avg: f64,
}

impl FeatureVector {
    /// Values in `FEATURE_SCHEMA` order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.hour,
            self.day_of_week,
            self.month,
            self.is_rush_hour,
            self.is_weekend,
            self.heavy_rain,
            self.hot_weather,
            self.speed_ratio,
            self.location_encoded,
            self.rush_rain_interaction,
            self.volume_per_speed,
            self.metro_nearby,
            self.accidents_count,
            self.volume_3h_avg,
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        schema::feature_index(name).map(|i| self.values()[i])
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        schema::FEATURE_SCHEMA.into_iter().zip(self.values())
    }
}

pub fn is_rush_hour(hour: u8) -> bool {
    RUSH_HOURS.contains(&hour)
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Builds the feature vector for a query. Fails before touching the model if
/// the hour or location is out of vocabulary.
pub fn assemble(
    query: &TrafficQuery,
    encoder: &LocationEncoder,
) -> Result<FeatureVector, PredictError> {
    if query.hour > 23 {
        return Err(PredictError::InvalidHour(query.hour));
    }
    let location = encoder.transform(&query.location)?;
    let rush = is_rush_hour(query.hour);

    Ok(FeatureVector {
        hour: f64::from(query.hour),
        day_of_week: schema::DAY_OF_WEEK,
        month: schema::MONTH,
        is_rush_hour: flag(rush),
        is_weekend: schema::IS_WEEKEND,
        heavy_rain: flag(query.heavy_rain),
        hot_weather: schema::HOT_WEATHER,
        speed_ratio: schema::SPEED_RATIO,
        location_encoded: location as f64,
        rush_rain_interaction: flag(rush && query.heavy_rain),
        volume_per_speed: schema::VOLUME_PER_SPEED,
        metro_nearby: schema::METRO_NEARBY,
        accidents_count: flag(query.accident),
        volume_3h_avg: schema::VOLUME_3H_AVG,
    })
}
