//! Numerical utilities for the draftrank rating engine.
//!
//! This crate has no domain types, so it can be tested
//! without a card catalogue or a scoring model:
//!
//! - **Population statistics** ([`descriptive`]): mean, variance and standard deviation
//!   over the full set of raw scores (population, not sample, statistics)
//! - **Normalization** ([`normalize`]): logistic mapping of raw scores onto the open
//!   interval (0, 100)
//!
//! # Examples
//!
//! ```
//! use draftrank_stats::{descriptive::PopulationStats, normalize};
//!
//! let raw = [0.2, 0.8];
//! let stats = PopulationStats::new(&raw).unwrap();
//! assert!((stats.mean - 0.5).abs() < 1e-6);
//! assert!((stats.std_dev - 0.3).abs() < 1e-6);
//!
//! let ratings = normalize::normalize(&raw);
//! assert!(ratings[0] < 50.0 && ratings[1] > 50.0);
//! ```
//!
//! Identical raw scores never divide by zero:
//!
//! ```
//! use draftrank_stats::normalize::{self, NEUTRAL_RATING};
//!
//! let ratings = normalize::normalize(&[0.7, 0.7, 0.7]);
//! assert!(ratings.iter().all(|r| *r == NEUTRAL_RATING));
//! ```

pub mod descriptive;
pub mod normalize;
