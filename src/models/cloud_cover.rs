//! GLOBE total cloud cover categories and conversion to/from cloud fraction.
//!
//! Two tables live here and are deliberately independent:
//! - the binning thresholds used to turn a model fraction into a category;
//! - the representative midpoints used to turn a category back into a fraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudCover {
    None,
    Clear,
    Few,
    Isolated,
    Scattered,
    Broken,
    Overcast,
    Obscured,
}

/// Inclusive upper bounds, ascending. The first bound >= fraction wins.
const BIN_THRESHOLDS: [(f64, CloudCover); 6] = [
    (0.00, CloudCover::None),
    (0.10, CloudCover::Few),
    (0.25, CloudCover::Isolated),
    (0.50, CloudCover::Scattered),
    (0.90, CloudCover::Broken),
    (1.00, CloudCover::Overcast),
];

impl CloudCover {
    /// All values accepted in the cloud cover field of a sky conditions record.
    pub const ALL: [CloudCover; 8] = [
        CloudCover::None,
        CloudCover::Clear,
        CloudCover::Few,
        CloudCover::Isolated,
        CloudCover::Scattered,
        CloudCover::Broken,
        CloudCover::Overcast,
        CloudCover::Obscured,
    ];

    /// Categories a fraction can be binned into.
    pub const BINNED: [CloudCover; 6] = [
        CloudCover::None,
        CloudCover::Few,
        CloudCover::Isolated,
        CloudCover::Scattered,
        CloudCover::Broken,
        CloudCover::Overcast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudCover::None => "none",
            CloudCover::Clear => "clear",
            CloudCover::Few => "few",
            CloudCover::Isolated => "isolated",
            CloudCover::Scattered => "scattered",
            CloudCover::Broken => "broken",
            CloudCover::Overcast => "overcast",
            CloudCover::Obscured => "obscured",
        }
    }

    /// Inclusive upper bound of the binning interval, for binnable categories.
    pub fn upper_bound(&self) -> Option<f64> {
        BIN_THRESHOLDS
            .iter()
            .find(|(_, category)| category == self)
            .map(|(bound, _)| *bound)
    }

    pub fn midpoint(&self, table: MidpointTable) -> f64 {
        table.midpoint(*self)
    }
}

impl fmt::Display for CloudCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudCover {
    type Err = QaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CloudCover::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| QaError::UnknownCategory(s.to_string()))
    }
}

/// Category-to-fraction midpoint tables.
///
/// `Standard` is the canonical table. `LegacyClearZero` is an older variant
/// (clear = 0.00, obscured = 1.00) kept selectable until its use is confirmed
/// or retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidpointTable {
    #[default]
    Standard,
    LegacyClearZero,
}

impl MidpointTable {
    pub fn midpoint(&self, category: CloudCover) -> f64 {
        match (self, category) {
            (_, CloudCover::None) => 0.00,
            (MidpointTable::Standard, CloudCover::Clear) => 0.05,
            (MidpointTable::LegacyClearZero, CloudCover::Clear) => 0.00,
            (_, CloudCover::Few) => 0.05,
            (_, CloudCover::Isolated) => 0.175,
            (_, CloudCover::Scattered) => 0.375,
            (_, CloudCover::Broken) => 0.70,
            (_, CloudCover::Overcast) => 0.95,
            (MidpointTable::Standard, CloudCover::Obscured) => 0.95,
            (MidpointTable::LegacyClearZero, CloudCover::Obscured) => 1.00,
        }
    }
}

/// Bin a cloud fraction in [0, 1] into a category.
pub fn fraction_to_category(fraction: f64) -> Result<CloudCover> {
    bin_cloud_fraction(fraction, false)
}

/// Bin a cloud fraction, optionally clamping it into [0, 1] first.
///
/// Without `clip`, fractions outside [0, 1] (and NaN) are rejected.
pub fn bin_cloud_fraction(fraction: f64, clip: bool) -> Result<CloudCover> {
    let fraction = if clip && !fraction.is_nan() {
        fraction.clamp(0.0, 1.0)
    } else {
        fraction
    };

    if !(0.0..=1.0).contains(&fraction) {
        return Err(QaError::FractionOutOfRange(fraction));
    }

    BIN_THRESHOLDS
        .iter()
        .find(|(bound, _)| fraction <= *bound)
        .map(|(_, category)| *category)
        .ok_or(QaError::FractionOutOfRange(fraction))
}

/// Representative fraction for a category using the canonical table.
pub fn category_to_midpoint(category: CloudCover) -> f64 {
    MidpointTable::Standard.midpoint(category)
}
