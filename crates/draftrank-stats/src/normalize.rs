//! Logistic normalization of raw scores onto the (0, 100) rating scale.
//!
//! Each raw score is converted to a standard score against the population it
//! came from and passed through a logistic curve:
//!
//! ```text
//! rating = 100 / (1 + exp(-(score - μ) / σ))
//! ```
//!
//! The mapping is monotonic, so the order of the raw scores is preserved.
//!
//! # Relative Scale
//!
//! `μ` and `σ` are recomputed on every call. Two normalized vectors produced from
//! different raw vectors are therefore on different scales, and the difference
//! between them (the synergy signal) is a difference between two independently
//! normalized scales. Callers rely on exactly this behavior.
//!
//! # Degenerate Populations
//!
//! - Empty input produces empty output.
//! - A constant population (a single card, or the neutral fallback vector) maps
//!   every entry to [`NEUTRAL_RATING`] instead of dividing by zero.

use crate::descriptive::PopulationStats;

/// Rating assigned to every card when the raw scores carry no information.
pub const NEUTRAL_RATING: f64 = 50.0;

/// Upper end of the rating scale (exclusive).
pub const RATING_SCALE: f64 = 100.0;

/// Standard scores are clamped to this magnitude so the logistic curve never
/// rounds to exactly 0 or 100.
const MAX_Z_SCORE: f64 = 30.0;

/// Normalizes raw scores to ratings in the open interval (0, 100).
///
/// # Examples
///
/// ```
/// use draftrank_stats::normalize;
///
/// let ratings = normalize::normalize(&[0.2, 0.8]);
/// // z = ±1 for a two-element population
/// assert!((ratings[0] - 26.894).abs() < 1e-3);
/// assert!((ratings[1] - 73.106).abs() < 1e-3);
/// ```
#[must_use]
pub fn normalize(raw_scores: &[f32]) -> Vec<f64> {
    let Some(stats) = PopulationStats::new(raw_scores) else {
        return vec![];
    };
    if stats.is_constant() {
        return vec![NEUTRAL_RATING; raw_scores.len()];
    }
    raw_scores
        .iter()
        .map(|score| logistic_rating(stats.z_score(f64::from(*score))))
        .collect()
}

/// Maps a standard score onto the rating scale.
#[must_use]
pub fn logistic_rating(z_score: f64) -> f64 {
    let z = z_score.clamp(-MAX_Z_SCORE, MAX_Z_SCORE);
    RATING_SCALE / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn assert_in_open_range(ratings: &[f64]) {
        for (i, r) in ratings.iter().enumerate() {
            assert!(r.is_finite(), "rating #{i} is not finite: {r}");
            assert!(*r > 0.0 && *r < RATING_SCALE, "rating #{i} out of range: {r}");
        }
    }

    #[test]
    fn test_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_single_element_is_neutral() {
        assert_eq!(normalize(&[3.5]), vec![NEUTRAL_RATING]);
    }

    #[test]
    fn test_all_equal_is_neutral() {
        assert_eq!(normalize(&[50.0; 7]), vec![NEUTRAL_RATING; 7]);
        assert_eq!(normalize(&[0.1; 101]), vec![NEUTRAL_RATING; 101]);
    }

    #[test]
    fn test_two_element_ratings_are_symmetric() {
        // With two cards the standard scores are always ±1, whatever the raw gap.
        let wide = normalize(&[0.2, 0.8]);
        let narrow = normalize(&[0.3, 0.7]);
        assert!((wide[0] - narrow[0]).abs() < 1e-9);
        assert!((wide[1] - narrow[1]).abs() < 1e-9);
        assert!((wide[0] + wide[1] - RATING_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_order_preserved() {
        let raw = [0.5, -2.0, 3.0, 0.25, 3.0];
        let ratings = normalize(&raw);
        for i in 0..raw.len() {
            for j in 0..raw.len() {
                if raw[i] < raw[j] {
                    assert!(ratings[i] < ratings[j]);
                } else if raw[i] == raw[j] {
                    assert_eq!(ratings[i], ratings[j]);
                }
            }
        }
    }

    #[test]
    fn test_mean_maps_to_midpoint() {
        let ratings = normalize(&[1.0, 2.0, 3.0]);
        assert!((ratings[1] - NEUTRAL_RATING).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_outlier_stays_inside_range() {
        let mut raw = vec![0.0_f32; 2000];
        raw[0] = 1.0e6;
        let ratings = normalize(&raw);
        assert_in_open_range(&ratings);
        assert!(ratings[0] > ratings[1]);
    }

    #[test]
    fn test_random_populations_stay_inside_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let len: usize = rng.random_range(1..400);
            let scale: f32 = rng.random_range(1.0e-3..1.0e3);
            let raw = (0..len)
                .map(|_| rng.random_range(-1.0_f32..1.0) * scale)
                .collect::<Vec<f32>>();
            let ratings = normalize(&raw);
            assert_eq!(ratings.len(), raw.len());
            assert_in_open_range(&ratings);
        }
    }

    #[test]
    fn test_logistic_clamps() {
        assert!(logistic_rating(1.0e9) < RATING_SCALE);
        assert!(logistic_rating(-1.0e9) > 0.0);
        assert_eq!(logistic_rating(0.0), NEUTRAL_RATING);
    }
}
