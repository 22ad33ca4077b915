//! Air Quality Index classification.
//!
//! Maps a numeric AQI onto the six CPCB severity bins and exposes the display
//! metadata (color, label, health advisory) attached to each bin.
//!
//! # Example
//!
//! ```
//! use vayuwatch::aqi::{classify, Category};
//!
//! let category = classify(312.0);
//! assert_eq!(category, Category::VeryPoor);
//! assert_eq!(category.label(), "Very Poor");
//! assert_eq!(category.color(), "#ef4444");
//! ```

mod advisory;
mod grap;

use serde::{Deserialize, Serialize};

pub use advisory::HealthAdvisory;
pub use grap::{active_grap_stages, grap_stage, GrapStage, GRAP_STAGES};

/// Upper end of the AQI scale used for gauges.
pub const AQI_SCALE_MAX: f64 = 500.0;

/// One of the six CPCB air quality bins, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// AQI 0-50.
    Good,
    /// AQI 51-100.
    Satisfactory,
    /// AQI 101-200.
    Moderate,
    /// AQI 201-300.
    Poor,
    /// AQI 301-400.
    VeryPoor,
    /// AQI 401 and above.
    Severe,
}

impl Category {
    /// All categories, least to most severe.
    pub const ALL: [Category; 6] = [
        Self::Good,
        Self::Satisfactory,
        Self::Moderate,
        Self::Poor,
        Self::VeryPoor,
        Self::Severe,
    ];

    /// Stable identifier, as used in persisted data and URLs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Satisfactory => "satisfactory",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
            Self::VeryPoor => "very-poor",
            Self::Severe => "severe",
        }
    }

    /// Display color as a hex string.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#22c55e",
            Self::Satisfactory => "#84cc16",
            Self::Moderate => "#eab308",
            Self::Poor => "#f97316",
            Self::VeryPoor => "#ef4444",
            Self::Severe => "#7f1d1d",
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::Severe => "Severe",
        }
    }

    /// Health advisory for this category.
    #[must_use]
    pub fn advisory(self) -> HealthAdvisory {
        HealthAdvisory::for_category(self)
    }

    /// Inclusive AQI bounds of this bin. `Severe` is open-ended.
    #[must_use]
    pub fn range(self) -> (u32, Option<u32>) {
        match self {
            Self::Good => (0, Some(50)),
            Self::Satisfactory => (51, Some(100)),
            Self::Moderate => (101, Some(200)),
            Self::Poor => (201, Some(300)),
            Self::VeryPoor => (301, Some(400)),
            Self::Severe => (401, None),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown AQI category: {s}"))
    }
}

/// Classify an AQI value.
///
/// Total over `f64`: negative values land in `Good`, anything above 400
/// (including values past the 500 scale and NaN) lands in `Severe`.
#[must_use]
pub fn classify(aqi: f64) -> Category {
    if aqi <= 50.0 {
        Category::Good
    } else if aqi <= 100.0 {
        Category::Satisfactory
    } else if aqi <= 200.0 {
        Category::Moderate
    } else if aqi <= 300.0 {
        Category::Poor
    } else if aqi <= 400.0 {
        Category::VeryPoor
    } else {
        Category::Severe
    }
}

/// Fill fraction of an AQI gauge, in `[0, 1]`.
#[must_use]
pub fn gauge_fraction(aqi: f64) -> f64 {
    (aqi / AQI_SCALE_MAX).clamp(0.0, 1.0)
}

/// Round a derived AQI half-up and clamp it at zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_aqi(value: f64) -> u32 {
    (value + 0.5).floor().clamp(0.0, f64::from(u32::MAX)) as u32
}
