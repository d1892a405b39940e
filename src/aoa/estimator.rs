use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One antenna's contribution to an AoA estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub index: usize,
    pub offset: f64, // boresight offset within the array, rad
    pub rss: f64,
}

// ---------------------------------------------------------------------------
// Estimator selection
// ---------------------------------------------------------------------------

/// Angle-of-arrival estimator. Output is a bearing in the drone body frame (rad).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AoaEstimator {
    /// Boresight of the strongest antenna.
    MaxRss,
    /// rss-weighted mean of the two strongest boresights.
    #[default]
    WeightedRss,
}

impl AoaEstimator {
    pub const NAMES: &'static str = "max-rss, weighted-rss";

    pub fn name(&self) -> &'static str {
        match self {
            AoaEstimator::MaxRss => "max-rss",
            AoaEstimator::WeightedRss => "weighted-rss",
        }
    }

    pub fn estimate(&self, readings: &[Reading]) -> Result<f64> {
        match self {
            AoaEstimator::MaxRss => max_rss(readings),
            AoaEstimator::WeightedRss => weighted_rss(readings),
        }
    }
}

impl fmt::Display for AoaEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for AoaEstimator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max-rss" => Ok(AoaEstimator::MaxRss),
            "weighted-rss" => Ok(AoaEstimator::WeightedRss),
            other => Err(Error::UnsupportedAlgorithm {
                kind: "AoA estimator",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Readings ordered by rss, strongest first. Among equal rss the later
/// antenna ranks higher.
fn strongest_first(readings: &[Reading]) -> Vec<Reading> {
    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| a.rss.total_cmp(&b.rss));
    sorted.reverse();
    sorted
}

/// Boresight offset of the antenna with the greatest rss.
///
/// Resolution is limited to the antenna spacing.
pub fn max_rss(readings: &[Reading]) -> Result<f64> {
    strongest_first(readings)
        .first()
        .map(|r| r.offset)
        .ok_or(Error::EmptyReadings)
}

/// rss-weighted mean of the two strongest boresight offsets.
///
/// When the two offsets are more than half a turn apart they straddle the
/// 0/2π wrap, so the smaller one is lifted by a full turn before averaging.
/// The result is therefore not normalised and may exceed 2π.
pub fn weighted_rss(readings: &[Reading]) -> Result<f64> {
    let sorted = strongest_first(readings);
    let (first, second) = match sorted.as_slice() {
        [] => return Err(Error::EmptyReadings),
        [only] => return Ok(only.offset),
        [first, second, ..] => (*first, *second),
    };

    let (mut phi1, mut phi2) = (first.offset, second.offset);
    if (phi1 - phi2).abs() > PI {
        if phi1 > phi2 {
            phi2 += TAU;
        } else {
            phi1 += TAU;
        }
    }

    Ok((first.rss * phi1 + second.rss * phi2) / (first.rss + second.rss))
}
