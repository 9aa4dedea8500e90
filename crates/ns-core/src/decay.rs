//! Distance-decay weighting for accessibility aggregates.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// How a node's contribution shrinks with network distance.
///
/// For a node at network distance `d` from the source and a search radius
/// `r`, the weight is:
///
/// | Variant       | Weight          |
/// |---------------|-----------------|
/// | `Linear`      | `1 - d / r`     |
/// | `Exponential` | `exp(-d / r)`   |
/// | `Flat`        | `1`             |
///
/// Nodes beyond `r` never contribute regardless of variant.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Decay {
    #[default]
    Linear,
    #[cfg_attr(feature = "serde", serde(alias = "exp"))]
    Exponential,
    /// Uniform weighting; no decay.
    Flat,
}

impl Decay {
    /// Weight for a node at distance `d` within radius `r`.
    #[inline]
    pub fn weight(self, d: f64, r: f64) -> f64 {
        if r <= 0.0 {
            return if d <= 0.0 { 1.0 } else { 0.0 };
        }
        match self {
            Decay::Linear      => (1.0 - d / r).max(0.0),
            Decay::Exponential => (-d / r).exp(),
            Decay::Flat        => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decay::Linear      => "linear",
            Decay::Exponential => "exp",
            Decay::Flat        => "flat",
        }
    }
}

impl FromStr for Decay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear"               => Ok(Decay::Linear),
            "exp" | "exponential"  => Ok(Decay::Exponential),
            "flat" | "none"        => Ok(Decay::Flat),
            other                  => Err(CoreError::UnknownDecay(other.to_owned())),
        }
    }
}

impl fmt::Display for Decay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
