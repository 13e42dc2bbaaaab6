//! Closed float ranges and the clamping rules used when editing them.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mirrors `value.clamp(min, max)` but never panics: `min` is checked first.
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

fn clamp01(value: f32) -> f32 {
    clamp(value, 0.0, 1.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxFloat {
    pub min: f32,
    pub max: f32,
}

impl MinMaxFloat {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        clamp(value, self.min, self.max)
    }

    /// Uniform sample in `[min, max]`.
    pub fn random_value(&self) -> f32 {
        self.random_value_with(&mut rand::rng())
    }

    pub fn random_value_with<R: Rng>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if lo == hi {
            return lo;
        }
        rng.random_range(lo..=hi)
    }

    /// Where `value` sits in the range, clamped to `[0, 1]`. Zero for an empty range.
    pub fn inv_interpolated(&self, value: f32) -> f32 {
        if self.min == self.max {
            return 0.0;
        }
        clamp01((value - self.min) / (self.max - self.min))
    }

    /// Value at `t` (clamped to `[0, 1]`) along the range.
    pub fn interpolated(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * clamp01(t)
    }
}

/// Bounds a [`MinMaxFloat`] may be edited within. Defaults to `0..1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for MinMaxLimits {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl MinMaxLimits {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /**
     * Applies an edit: the lower end may not leave the limits or pass the upper end,
     * then the upper end may not fall below the new lower end or leave the limits.
     */
    pub fn constrain(&self, range: MinMaxFloat) -> MinMaxFloat {
        let min = clamp(range.min, self.min, range.max);
        let max = clamp(range.max, min, self.max);
        MinMaxFloat { min, max }
    }
}
