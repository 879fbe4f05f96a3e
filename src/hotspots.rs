//! Static sample points for the dashboard map.
//!
//! These are hardcoded display values. Scores and labels were precomputed once
//! and are not produced by (or kept in sync with) the live predictor.

use serde::Serialize;

use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hotspot {
    pub location: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub score: f64,
    pub status: Status,
}

const fn spot(location: &'static str, lat: f64, lon: f64, score: f64, status: Status) -> Hotspot {
    Hotspot {
        location,
        lat,
        lon,
        score,
        status,
    }
}

pub const HOTSPOTS: [Hotspot; 7] = [
    spot("HITEC City", 17.4400, 78.3800, 2.15, Status::Jam),
    spot("Gachibowli", 17.4123, 78.3501, 1.92, Status::Moderate),
    spot("Raidurg", 17.4286, 78.3987, 1.78, Status::Moderate),
    spot("Banjara Hills", 17.4200, 78.4417, 1.65, Status::Clear),
    spot("Jubilee Hills", 17.4286, 78.4100, 1.88, Status::Moderate),
    spot("Madhapur", 17.4320, 78.3890, 1.95, Status::Moderate),
    spot("Cyber Towers", 17.4410, 78.3870, 2.05, Status::Moderate),
];

/// Hyderabad city centre.
pub const MAP_CENTER: (f64, f64) = (17.3850, 78.4867);
pub const MAP_ZOOM: u8 = 11;

#[derive(Debug, Clone, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Everything the map widget needs.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: LatLon,
    pub zoom: u8,
    /// Always true: the points are sample data, not live predictions.
    pub static_sample: bool,
    pub hotspots: &'static [Hotspot],
}

impl MapView {
    pub fn hyderabad() -> Self {
        Self {
            center: LatLon {
                lat: MAP_CENTER.0,
                lon: MAP_CENTER.1,
            },
            zoom: MAP_ZOOM,
            static_sample: true,
            hotspots: &HOTSPOTS,
        }
    }
}
