//! Distance metrics
//!
//! All metrics report a *distance*: smaller means more similar.
//!
//! | Metric         | Distance                      |
//! |----------------|-------------------------------|
//! | `cosine`       | `1 - (a/‖a‖) · (b/‖b‖)`       |
//! | `l2`           | `Σ (aᵢ - bᵢ)²` (squared)      |
//! | `inner_product`| `1 - a · b`                   |
//!
//! Cosine vectors are normalized once on the way in (see [`Metric::prepare`]),
//! after which cosine and inner product share the same kernel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::simd::{dot_product, l2_distance_squared, l2_normalized};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Cosine,
    #[serde(alias = "euclidean")]
    L2,
    #[serde(alias = "ip", alias = "dot")]
    InnerProduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::L2 => "l2",
            Metric::InnerProduct => "inner_product",
        }
    }

    /// Whether vectors are normalized before they are stored or compared.
    #[inline]
    pub fn normalizes(&self) -> bool {
        matches!(self, Metric::Cosine)
    }

    /// Turn a caller-supplied vector into the form the engine stores and compares.
    pub fn prepare(&self, v: &[f32]) -> Vec<f32> {
        if self.normalizes() {
            l2_normalized(v)
        } else {
            v.to_vec()
        }
    }

    /// Distance between two *prepared* vectors.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Cosine | Metric::InnerProduct => 1.0 - dot_product(a, b),
            Metric::L2 => l2_distance_squared(a, b),
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Metric::Cosine => 0,
            Metric::L2 => 1,
            Metric::InnerProduct => 2,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Metric::Cosine),
            1 => Some(Metric::L2),
            2 => Some(Metric::InnerProduct),
            _ => None,
        }
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "l2" | "euclidean" => Ok(Metric::L2),
            "ip" | "dot" | "inner_product" | "inner-product" => Ok(Metric::InnerProduct),
            other => Err(EngineError::InvalidConfig(format!(
                "unrecognized metric '{other}' (expected cosine, l2 or ip)"
            ))),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
