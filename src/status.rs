use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores at or above this are at least `MODERATE`.
pub const MODERATE_FROM: f64 = 1.5;
/// Scores at or above this are `JAM`.
pub const JAM_FROM: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Clear,
    Moderate,
    Jam,
}

impl Status {
    /// Half-open, lower-inclusive bands. NaN falls through to `Jam`.
    pub fn classify(score: f64) -> Self {
        if score < MODERATE_FROM {
            Status::Clear
        } else if score < JAM_FROM {
            Status::Moderate
        } else {
            Status::Jam
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Clear => "CLEAR",
            Status::Moderate => "MODERATE",
            Status::Jam => "JAM",
        }
    }

    /// Label shown next to the score on the dashboard.
    pub fn badge(&self) -> &'static str {
        match self {
            Status::Clear => "🟢 CLEAR",
            Status::Moderate => "🟡 MODERATE",
            Status::Jam => "🔴 JAM",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
