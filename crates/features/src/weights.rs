//! Importance weights for watch events.
//!
//! A watch event's weight starts from its recency (exponential decay with a
//! configurable half-life), then gets multiplied by a favorite boost and a
//! logarithmic rewatch boost, in that order.

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};

/// `2^(-days_since / half_life_days)`
pub fn exponential_decay(days_since: f32, half_life_days: f32) -> Result<f32> {
    if !(days_since >= 0.0) || !days_since.is_finite() {
        return Err(FeatureError::invalid("days_since", days_since, "must be finite and >= 0"));
    }
    if !(half_life_days > 0.0) || !half_life_days.is_finite() {
        return Err(FeatureError::invalid("half_life_days", half_life_days, "must be finite and > 0"));
    }
    Ok(2f32.powf(-days_since / half_life_days))
}

/// Multiply by `favorite_boost` when the item is a favorite
pub fn apply_favorite_boost(base_weight: f32, is_favorite: bool, favorite_boost: f32) -> Result<f32> {
    if !(base_weight >= 0.0) {
        return Err(FeatureError::invalid("base_weight", base_weight, "must be >= 0"));
    }
    if !(favorite_boost >= 0.0) || !favorite_boost.is_finite() {
        return Err(FeatureError::invalid("favorite_boost", favorite_boost, "must be finite and >= 0"));
    }
    Ok(if is_favorite {
        base_weight * favorite_boost
    } else {
        base_weight
    })
}

/// `base_weight * (1 + log_rewatch_base(play_count))`
///
/// A single play returns `base_weight` untouched.
pub fn apply_rewatch_boost(base_weight: f32, play_count: u32, rewatch_base: f32) -> Result<f32> {
    if !(base_weight >= 0.0) {
        return Err(FeatureError::invalid("base_weight", base_weight, "must be >= 0"));
    }
    if play_count < 1 {
        return Err(FeatureError::invalid("play_count", play_count, "must be >= 1"));
    }
    if !(rewatch_base > 1.0) || !rewatch_base.is_finite() {
        return Err(FeatureError::invalid("rewatch_base", rewatch_base, "must be finite and > 1"));
    }
    if play_count == 1 {
        return Ok(base_weight);
    }
    Ok(base_weight * (1.0 + (play_count as f32).log(rewatch_base)))
}

/// Decay, then favorite boost, then rewatch boost
pub fn compute_combined_weight(
    days_since: f32,
    half_life_days: f32,
    is_favorite: bool,
    favorite_boost: f32,
    play_count: u32,
    rewatch_base: f32,
) -> Result<f32> {
    let weight = exponential_decay(days_since, half_life_days)?;
    let weight = apply_favorite_boost(weight, is_favorite, favorite_boost)?;
    apply_rewatch_boost(weight, play_count, rewatch_base)
}

/// The three tunables of the weight formula, bundled for callers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightParams {
    pub half_life_days: f32,
    pub favorite_boost: f32,
    pub rewatch_base: f32,
}

impl Default for WeightParams {
    fn default() -> Self {
        Self {
            half_life_days: 90.0,
            favorite_boost: 1.5,
            rewatch_base: 2.0,
        }
    }
}

impl WeightParams {
    /// Check the parameters without computing anything
    pub fn validate(&self) -> Result<()> {
        compute_combined_weight(0.0, self.half_life_days, true, self.favorite_boost, 2, self.rewatch_base)
            .map(|_| ())
    }

    pub fn combined_weight(&self, days_since: f32, is_favorite: bool, play_count: u32) -> Result<f32> {
        compute_combined_weight(
            days_since,
            self.half_life_days,
            is_favorite,
            self.favorite_boost,
            play_count,
            self.rewatch_base,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_exponential_decay_half_lives() {
        for h in [1.0, 7.0, 30.0, 365.0] {
            assert_eq!(exponential_decay(0.0, h).unwrap(), 1.0);
            assert!((exponential_decay(h, h).unwrap() - 0.5).abs() < EPS);
            assert!((exponential_decay(2.0 * h, h).unwrap() - 0.25).abs() < EPS);
        }
    }

    #[test]
    fn test_exponential_decay_validation() {
        assert!(exponential_decay(-1.0, 30.0).is_err());
        assert!(exponential_decay(1.0, 0.0).is_err());
        assert!(exponential_decay(1.0, -5.0).is_err());
        assert!(exponential_decay(f32::NAN, 30.0).is_err());
    }

    #[test]
    fn test_favorite_boost() {
        assert_eq!(apply_favorite_boost(0.5, true, 2.0).unwrap(), 1.0);
        assert_eq!(apply_favorite_boost(0.5, false, 2.0).unwrap(), 0.5);
        assert_eq!(apply_favorite_boost(0.5, true, 0.0).unwrap(), 0.0);
        assert!(apply_favorite_boost(-0.1, true, 2.0).is_err());
        assert!(apply_favorite_boost(0.5, false, -2.0).is_err());
    }

    #[test]
    fn test_rewatch_boost() {
        assert_eq!(apply_rewatch_boost(0.8, 1, 2.0).unwrap(), 0.8);
        // log2(4) = 2 -> 0.5 * 3
        assert!((apply_rewatch_boost(0.5, 4, 2.0).unwrap() - 1.5).abs() < EPS);
        // log10(10) = 1 -> doubled
        assert!((apply_rewatch_boost(1.0, 10, 10.0).unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_rewatch_boost_validation() {
        assert!(apply_rewatch_boost(1.0, 0, 2.0).is_err());
        assert!(apply_rewatch_boost(1.0, 3, 1.0).is_err());
        assert!(apply_rewatch_boost(1.0, 3, 0.5).is_err());
        assert!(apply_rewatch_boost(-1.0, 3, 2.0).is_err());
    }

    #[test]
    fn test_combined_weight_order() {
        // decay 0.5, favorite x2 -> 1.0, rewatch log2(2)=1 -> 2.0
        let w = compute_combined_weight(30.0, 30.0, true, 2.0, 2, 2.0).unwrap();
        assert!((w - 2.0).abs() < EPS);

        let params = WeightParams {
            half_life_days: 30.0,
            favorite_boost: 2.0,
            rewatch_base: 2.0,
        };
        assert!((params.combined_weight(30.0, false, 1).unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_weight_params_validate() {
        assert!(WeightParams::default().validate().is_ok());
        let bad = WeightParams {
            rewatch_base: 1.0,
            ..WeightParams::default()
        };
        assert!(bad.validate().is_err());
    }
}
