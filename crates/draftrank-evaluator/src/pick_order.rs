//! Pick-order recompute: score, normalize, filter, sort, truncate.
//!
//! A recompute has two halves:
//!
//! 1. [`PickOrderBuilder::rate`] scores the catalogue twice (empty and
//!    current ownership), normalizes both vectors and derives the synergy.
//!    This is the only part that waits on the scoring model, and it only needs
//!    owned inputs, so it can run detached from the session state.
//! 2. [`build_snapshot`] validates the ratings, assembles the filtered and
//!    sorted rows, and only then commits the ratings to the catalogue.
//!
//! Ratings reach the catalogue all at once or not at all.

use draftrank_catalogue::{
    CardRatings, Catalogue, ColorIdentity, OwnershipLedger, Rarity, RatingsLengthMismatch,
};
use draftrank_stats::normalize;

use crate::{
    filter::{self, FilterSelection, PickLimit},
    scoring_adapter::{ScoreSource, ScoreVector, ScoringAdapter},
    scoring_model::ModelInputs,
};

/// One row of the pick order.
#[derive(Debug, Clone, PartialEq)]
pub struct PickRow {
    /// Catalogue index of the card.
    pub index: usize,
    pub name: String,
    pub rarity: Rarity,
    pub color_identity: ColorIdentity,
    pub owned: u32,
    pub ratings: CardRatings,
}

/// Per-card ratings of one recompute, before they are committed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedCards {
    pub seq: u64,
    /// Aligned with catalogue order.
    pub ratings: Vec<CardRatings>,
    pub baseline_source: ScoreSource,
    pub current_source: ScoreSource,
}

impl RatedCards {
    /// Builds ratings from the baseline and current raw score vectors.
    #[must_use]
    pub fn from_scores(seq: u64, baseline: ScoreVector, current: ScoreVector) -> Self {
        let baseline_ratings = normalize::normalize(&baseline.scores);
        let current_ratings = normalize::normalize(&current.scores);
        let ratings = current_ratings
            .into_iter()
            .zip(baseline_ratings)
            .map(|(rating, baseline)| CardRatings::new(rating, baseline))
            .collect();
        Self {
            seq,
            ratings,
            baseline_source: baseline.source,
            current_source: current.source,
        }
    }

    /// Whether either scoring pass fell back to neutral scores.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.baseline_source.is_fallback() || self.current_source.is_fallback()
    }
}

/// Ordered, filtered and truncated result of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSnapshot {
    pub seq: u64,
    pub rows: Vec<PickRow>,
    /// Number of cards that passed the filters, before truncation.
    pub matched: usize,
    pub baseline_source: ScoreSource,
    pub current_source: ScoreSource,
}

impl RatingSnapshot {
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.baseline_source.is_fallback() || self.current_source.is_fallback()
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RecomputeError {
    #[display("ratings do not cover the catalogue")]
    RatingsLength(RatingsLengthMismatch),
    #[display("rating of card {index} is not finite")]
    NonFiniteRating { index: usize },
}

impl From<RatingsLengthMismatch> for RecomputeError {
    fn from(err: RatingsLengthMismatch) -> Self {
        Self::RatingsLength(err)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PickOrderBuilder {
    adapter: ScoringAdapter,
}

impl PickOrderBuilder {
    #[must_use]
    pub fn new(adapter: ScoringAdapter) -> Self {
        Self { adapter }
    }

    #[must_use]
    pub fn adapter(&self) -> &ScoringAdapter {
        &self.adapter
    }

    /// Scores `current` and the matching empty-ownership inputs.
    pub async fn rate(&self, seq: u64, current: ModelInputs) -> RatedCards {
        let baseline = self.adapter.score(ModelInputs::empty(current.len())).await;
        let current = self.adapter.score(current).await;
        RatedCards::from_scores(seq, baseline, current)
    }

    /// Runs a full recompute against `catalogue` and commits its ratings.
    pub async fn recompute(
        &self,
        seq: u64,
        catalogue: &mut Catalogue,
        ledger: &OwnershipLedger,
        selection: &FilterSelection,
    ) -> Result<RatingSnapshot, RecomputeError> {
        let rated = self
            .rate(seq, ModelInputs::from_ledger(catalogue, ledger))
            .await;
        build_snapshot(catalogue, ledger, selection, rated)
    }
}

/// Assembles the pick order from `rated` and commits the ratings.
///
/// Nothing is written to `catalogue` unless every rating is valid.
pub fn build_snapshot(
    catalogue: &mut Catalogue,
    ledger: &OwnershipLedger,
    selection: &FilterSelection,
    rated: RatedCards,
) -> Result<RatingSnapshot, RecomputeError> {
    if rated.ratings.len() != catalogue.len() {
        return Err(RatingsLengthMismatch {
            expected: catalogue.len(),
            actual: rated.ratings.len(),
        }
        .into());
    }
    if let Some(index) = rated.ratings.iter().position(|r| !r.is_finite()) {
        return Err(RecomputeError::NonFiniteRating { index });
    }

    let indices = filter::filter_indices(catalogue, ledger, selection);
    let matched = indices.len();
    let mut rows = indices
        .into_iter()
        .map(|index| {
            let card = &catalogue.cards()[index];
            PickRow {
                index,
                name: card.name().to_owned(),
                rarity: card.rarity(),
                color_identity: card.color_identity().clone(),
                owned: ledger.count(card.name()),
                ratings: rated.ratings[index],
            }
        })
        .collect::<Vec<_>>();

    // `sort_by` is stable, and `indices` is in catalogue order.
    rows.sort_by(|a, b| b.ratings.rating.total_cmp(&a.ratings.rating));
    if let PickLimit::Top(n) = selection.limit() {
        rows.truncate(n);
    }

    catalogue.commit_ratings(rated.seq, &rated.ratings)?;

    Ok(RatingSnapshot {
        seq: rated.seq,
        rows,
        matched,
        baseline_source: rated.baseline_source,
        current_source: rated.current_source,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use draftrank_stats::normalize::NEUTRAL_RATING;
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        linear_model::{LinearScoringModel, SynergyWeight},
        scoring_adapter::FallbackReason,
    };

    const CARD_LIST: &str = "\
name,rarity,color_identity
A,common,W
B,rare,U
C,uncommon,B
";

    /// Scores `[0.2, 0.8, 0.5]` with an empty collection and
    /// `[0.6, 0.7, 0.2]` after one pick of A.
    fn model() -> LinearScoringModel {
        LinearScoringModel {
            name: "tst".to_owned(),
            set_code: "TST".to_owned(),
            trained_at: Utc::now(),
            output_name: "scores".to_owned(),
            biases: vec![0.2, 0.8, 0.5],
            synergies: vec![
                SynergyWeight {
                    owned: 0,
                    target: 0,
                    weight: 0.4,
                },
                SynergyWeight {
                    owned: 0,
                    target: 1,
                    weight: -0.1,
                },
                SynergyWeight {
                    owned: 0,
                    target: 2,
                    weight: -0.3,
                },
            ],
        }
    }

    fn builder() -> PickOrderBuilder {
        PickOrderBuilder::new(ScoringAdapter::with_model(Arc::new(model())))
    }

    fn rating_of(catalogue: &Catalogue, name: &str) -> CardRatings {
        *catalogue.card(name).unwrap().ratings().unwrap()
    }

    #[tokio::test]
    async fn test_synergy_after_pick() {
        let mut catalogue = Catalogue::from_csv_str("TST", CARD_LIST).unwrap();
        let mut ledger = OwnershipLedger::new();
        let selection = FilterSelection::new().with_limit(PickLimit::All);

        let snapshot = builder()
            .recompute(1, &mut catalogue, &ledger, &selection)
            .await
            .unwrap();
        assert_eq!(snapshot.names(), vec!["B", "C", "A"]);
        assert!(rating_of(&catalogue, "A").rating < rating_of(&catalogue, "B").rating);
        assert!(
            catalogue
                .cards()
                .iter()
                .all(|c| c.ratings().unwrap().synergy.abs() < 1e-9)
        );

        ledger.pick("A");
        let snapshot = builder()
            .recompute(2, &mut catalogue, &ledger, &selection)
            .await
            .unwrap();
        assert_eq!(snapshot.names(), vec!["B", "A", "C"]);
        assert_eq!(catalogue.ratings_seq(), Some(2));

        let a = rating_of(&catalogue, "A");
        let b = rating_of(&catalogue, "B");
        assert!(a.synergy > 0.0, "{a:?}");
        assert!(b.synergy < 0.0, "{b:?}");
        assert!((a.baseline_rating - 22.71).abs() < 0.01, "{a:?}");
        assert!((a.rating - 61.37).abs() < 0.01, "{a:?}");
        assert!(b.rating - a.rating < b.baseline_rating - a.baseline_rating);
        assert_eq!(snapshot.rows[1].owned, 1);
    }

    #[test]
    fn test_two_card_population_is_scale_free() {
        // With two cards each score sits exactly one σ from the mean, so any
        // ordered pair normalizes to the same ratings and synergy vanishes.
        let rated = RatedCards::from_scores(
            1,
            ScoreVector {
                scores: vec![0.2, 0.8],
                source: ScoreSource::Model {
                    output: "scores".to_owned(),
                },
            },
            ScoreVector {
                scores: vec![0.3, 0.7],
                source: ScoreSource::Model {
                    output: "scores".to_owned(),
                },
            },
        );
        for r in &rated.ratings {
            assert!(r.synergy.abs() < 1e-9, "{r:?}");
        }
        assert!(rated.ratings[0].rating < rated.ratings[1].rating);
    }

    #[tokio::test]
    async fn test_fallback_is_neutral_in_catalogue_order() {
        let mut catalogue = Catalogue::from_csv_str("TST", CARD_LIST).unwrap();
        let mut ledger = OwnershipLedger::new();
        ledger.pick("C");
        let selection = FilterSelection::new().with_limit(PickLimit::All);

        let snapshot = PickOrderBuilder::default()
            .recompute(1, &mut catalogue, &ledger, &selection)
            .await
            .unwrap();
        assert_eq!(snapshot.names(), vec!["A", "B", "C"]);
        assert!(snapshot.is_degraded());
        assert_eq!(
            snapshot.current_source.fallback_reason(),
            Some(&FallbackReason::ModelUnavailable)
        );
        for row in &snapshot.rows {
            assert_eq!(row.ratings.rating, NEUTRAL_RATING);
            assert_eq!(row.ratings.synergy, 0.0);
        }
    }

    #[tokio::test]
    async fn test_model_for_other_set_falls_back() {
        let mut catalogue =
            Catalogue::from_csv_str("TST", "name,rarity,color_identity\nA,common,W\n").unwrap();
        let snapshot = builder()
            .recompute(1, &mut catalogue, &OwnershipLedger::new(), &FilterSelection::new())
            .await
            .unwrap();
        assert!(matches!(
            snapshot.baseline_source.fallback_reason(),
            Some(FallbackReason::ModelFailed { .. })
        ));
        assert_eq!(snapshot.rows[0].ratings.rating, NEUTRAL_RATING);
    }

    #[test]
    fn test_ties_keep_catalogue_order_and_truncate() {
        let mut catalogue = Catalogue::from_csv_str(
            "TST",
            "name,rarity,color_identity\nA,common,W\nB,common,W\nC,common,W\nD,common,W\n",
        )
        .unwrap();
        let ratings = [60.0, 70.0, 60.0, 70.0]
            .map(|r| CardRatings::new(r, 50.0))
            .to_vec();
        let rated = RatedCards {
            seq: 3,
            ratings,
            baseline_source: ScoreSource::Model {
                output: "scores".to_owned(),
            },
            current_source: ScoreSource::Model {
                output: "scores".to_owned(),
            },
        };
        let selection = FilterSelection::new().with_limit(PickLimit::Top(3));
        let snapshot =
            build_snapshot(&mut catalogue, &OwnershipLedger::new(), &selection, rated).unwrap();
        assert_eq!(snapshot.names(), vec!["B", "D", "A"]);
        assert_eq!(snapshot.matched, 4);
    }

    #[test]
    fn test_invalid_ratings_are_not_committed() {
        let mut catalogue = Catalogue::from_csv_str("TST", CARD_LIST).unwrap();
        let source = ScoreSource::Fallback(FallbackReason::ModelUnavailable);
        let mut rated = RatedCards {
            seq: 1,
            ratings: vec![CardRatings::new(50.0, 50.0); 2],
            baseline_source: source.clone(),
            current_source: source,
        };
        let selection = FilterSelection::new();

        let err = build_snapshot(&mut catalogue, &OwnershipLedger::new(), &selection, rated.clone())
            .unwrap_err();
        assert!(matches!(err, RecomputeError::RatingsLength(_)));

        rated.ratings.push(CardRatings::new(f64::NAN, 50.0));
        let err =
            build_snapshot(&mut catalogue, &OwnershipLedger::new(), &selection, rated).unwrap_err();
        assert_eq!(err, RecomputeError::NonFiniteRating { index: 2 });

        assert_eq!(catalogue.ratings_seq(), None);
        assert!(catalogue.cards().iter().all(|c| c.ratings().is_none()));
    }

    #[tokio::test]
    async fn test_deck_only_returns_exactly_owned_cards() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let names = (0..30).map(|i| format!("Card {i}")).collect::<Vec<_>>();
        let rarities = ["common", "uncommon", "rare", "mythic", "special"];
        let colors = ["W", "U", "B", "R", "G", "WU"];
        let mut csv = "name,rarity,color_identity\n".to_owned();
        for name in &names {
            let rarity = rarities[rng.random_range(0..rarities.len())];
            let color = colors[rng.random_range(0..colors.len())];
            csv.push_str(&format!("{name},{rarity},{color}\n"));
        }
        let mut catalogue = Catalogue::from_csv_str("TST", &csv).unwrap();

        for round in 0..20 {
            let mut ledger = OwnershipLedger::new();
            for _ in 0..rng.random_range(0..15) {
                ledger.pick(&names[rng.random_range(0..names.len())]);
            }
            let selection = FilterSelection::new()
                .with_rarity(Rarity::Rare)
                .with_color(colors[rng.random_range(0..colors.len())])
                .with_limit(PickLimit::DeckOnly);

            let snapshot = PickOrderBuilder::default()
                .recompute(round, &mut catalogue, &ledger, &selection)
                .await
                .unwrap();
            let mut got = snapshot.names();
            got.sort_unstable();
            let want = ledger.collection().map(|(name, _)| name).collect::<Vec<_>>();
            assert_eq!(got, want);
        }
    }
}
