//! Rating pipeline that turns ownership state into a pick order.
//!
//! The pipeline has four stages:
//!
//! 1. **Scoring** ([`scoring_model`], [`scoring_adapter`]) - Builds the per-card input
//!    vectors, runs the external [`ScoringModel`](scoring_model::ScoringModel) under a
//!    timeout and picks the score array out of its outputs. Every failure degrades to a
//!    neutral score vector.
//!
//! 2. **Normalization** - Maps raw scores onto ratings in (0, 100) with
//!    [`draftrank_stats::normalize`].
//!
//! 3. **Filtering** ([`filter`]) - Selects the cards shown for the current rarity, color
//!    and limit selection. Pure; no model calls.
//!
//! 4. **Pick order** ([`pick_order`]) - Derives synergy, sorts and truncates, and commits
//!    the ratings to the catalogue.
//!
//! # Architecture
//!
//! ```text
//! OwnershipLedger ──▶ ModelInputs ──▶ ScoringAdapter ──▶ ScoreVector (baseline, current)
//!                                                            │
//!                                                            ▼ normalize
//! Catalogue ◀── commit ── RatingSnapshot ◀── sort/truncate ◀── filter ◀── RatedCards
//! ```
//!
//! Baseline scores come from the same model with an empty collection. Synergy is the
//! difference between the two normalized vectors; since each vector is normalized
//! against its own population, it measures a change in relative standing.
//!
//! [`linear_model`] provides the JSON-backed model used by the command-line tool.

pub mod filter;
pub mod linear_model;
pub mod pick_order;
pub mod scoring_adapter;
pub mod scoring_model;
