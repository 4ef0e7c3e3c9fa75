//! Read-only views for the presentation layer.
//!
//! Views read the ratings committed by the last recompute; they never score
//! anything themselves, so every view agrees with the pick order.

use draftrank_catalogue::{
    CardRatings, CardRecord, Catalogue, ColorIdentity, OwnershipLedger, Rarity,
};
use draftrank_evaluator::pick_order::RatingSnapshot;

/// Maximum number of results of a non-empty search.
pub const SEARCH_LIMIT: usize = 10;

/// Coarse band used to color ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RatingClass {
    High,
    Medium,
    Low,
}

impl RatingClass {
    pub const HIGH_THRESHOLD: f64 = 70.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    #[must_use]
    pub fn from_rating(rating: f64) -> Self {
        if rating >= Self::HIGH_THRESHOLD {
            RatingClass::High
        } else if rating >= Self::MEDIUM_THRESHOLD {
            RatingClass::Medium
        } else {
            RatingClass::Low
        }
    }
}

/// Synergy with an explicit sign, e.g. `+4.2` or `-0.7`.
#[must_use]
pub fn format_synergy(synergy: f64) -> String {
    format!("{synergy:+.1}")
}

/// One card as shown in deck, compare and search lists.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub name: String,
    pub rarity: Rarity,
    pub color_identity: ColorIdentity,
    /// Copies owned.
    pub count: u32,
    /// `None` until the first recompute commits.
    pub ratings: Option<CardRatings>,
}

impl CardView {
    fn new(card: &CardRecord, ledger: &OwnershipLedger) -> Self {
        Self {
            name: card.name().to_owned(),
            rarity: card.rarity(),
            color_identity: card.color_identity().clone(),
            count: ledger.count(card.name()),
            ratings: card.ratings().copied(),
        }
    }

    #[must_use]
    pub fn rating_class(&self) -> Option<RatingClass> {
        self.ratings.map(|r| RatingClass::from_rating(r.rating))
    }
}

/// State of the pick-order table.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum PickOrderView {
    /// No recompute has been committed for this session yet.
    Pending,
    Ready(RatingSnapshot),
    /// The last recompute failed; shown in place of the table.
    Degraded { message: String },
}

impl PickOrderView {
    #[must_use]
    pub fn snapshot(&self) -> Option<&RatingSnapshot> {
        match self {
            PickOrderView::Ready(snapshot) => Some(snapshot),
            PickOrderView::Pending | PickOrderView::Degraded { .. } => None,
        }
    }
}

/// Owned cards, best current rating first.
#[must_use]
pub fn deck_rows(catalogue: &Catalogue, ledger: &OwnershipLedger) -> Vec<CardView> {
    rows_by_rating(catalogue, ledger, ledger.collection().map(|(name, _)| name))
}

/// Staged cards, best current rating first.
#[must_use]
pub fn compare_rows(catalogue: &Catalogue, ledger: &OwnershipLedger) -> Vec<CardView> {
    rows_by_rating(catalogue, ledger, ledger.compare_set())
}

/// Cards whose name contains `query`, ignoring case.
///
/// Matches are listed in catalogue order, at most [`SEARCH_LIMIT`] of them. A
/// blank query lists every card alphabetically instead.
#[must_use]
pub fn search(catalogue: &Catalogue, ledger: &OwnershipLedger, query: &str) -> Vec<CardView> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        let mut cards = catalogue.cards().iter().collect::<Vec<_>>();
        cards.sort_by(|a, b| a.name().cmp(b.name()));
        return cards.into_iter().map(|c| CardView::new(c, ledger)).collect();
    }
    catalogue
        .cards()
        .iter()
        .filter(|c| c.name().to_lowercase().contains(&query))
        .take(SEARCH_LIMIT)
        .map(|c| CardView::new(c, ledger))
        .collect()
}

fn rows_by_rating<'a>(
    catalogue: &Catalogue,
    ledger: &OwnershipLedger,
    names: impl Iterator<Item = &'a str>,
) -> Vec<CardView> {
    let mut indices = names
        .filter_map(|name| catalogue.index_of(name))
        .collect::<Vec<_>>();
    indices.sort_unstable();
    let mut rows = indices
        .into_iter()
        .map(|i| CardView::new(&catalogue.cards()[i], ledger))
        .collect::<Vec<_>>();
    let key = |row: &CardView| row.ratings.map_or(f64::NEG_INFINITY, |r| r.rating);
    rows.sort_by(|a, b| key(b).total_cmp(&key(a)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        let mut catalogue = Catalogue::from_csv_str(
            "TST",
            "\
name,rarity,color_identity
Goblin Guide,common,R
Gobbling Ooze,rare,G
Angel of Dawn,mythic,W
Bog Wraith,uncommon,B
",
        )
        .unwrap();
        let ratings = [40.0, 80.0, 65.0, 80.0].map(|r| CardRatings::new(r, 50.0));
        catalogue.commit_ratings(1, &ratings).unwrap();
        catalogue
    }

    fn names(rows: &[CardView]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_rating_class() {
        assert_eq!(RatingClass::from_rating(70.0), RatingClass::High);
        assert_eq!(RatingClass::from_rating(69.9), RatingClass::Medium);
        assert_eq!(RatingClass::from_rating(50.0), RatingClass::Medium);
        assert_eq!(RatingClass::from_rating(49.9), RatingClass::Low);
    }

    #[test]
    fn test_format_synergy() {
        assert_eq!(format_synergy(4.24), "+4.2");
        assert_eq!(format_synergy(-0.71), "-0.7");
        assert_eq!(format_synergy(0.0), "+0.0");
    }

    #[test]
    fn test_deck_rows_sorted_by_rating_then_catalogue() {
        let catalogue = catalogue();
        let mut ledger = OwnershipLedger::new();
        for name in ["Bog Wraith", "Goblin Guide", "Gobbling Ooze", "Goblin Guide"] {
            ledger.pick(name);
        }
        let rows = deck_rows(&catalogue, &ledger);
        assert_eq!(names(&rows), vec!["Gobbling Ooze", "Bog Wraith", "Goblin Guide"]);
        assert_eq!(rows[2].count, 2);
        assert_eq!(rows[0].rating_class(), Some(RatingClass::High));
    }

    #[test]
    fn test_compare_rows() {
        let catalogue = catalogue();
        let mut ledger = OwnershipLedger::new();
        ledger.stage_compare("Goblin Guide");
        ledger.stage_compare("Angel of Dawn");
        let rows = compare_rows(&catalogue, &ledger);
        assert_eq!(names(&rows), vec!["Angel of Dawn", "Goblin Guide"]);
        assert_eq!(rows[0].count, 0);
    }

    #[test]
    fn test_search_is_case_insensitive_in_catalogue_order() {
        let catalogue = catalogue();
        let rows = search(&catalogue, &OwnershipLedger::new(), "  GOB ");
        assert_eq!(names(&rows), vec!["Goblin Guide", "Gobbling Ooze"]);
        assert!(search(&catalogue, &OwnershipLedger::new(), "zzz").is_empty());
    }

    #[test]
    fn test_blank_search_lists_everything_alphabetically() {
        let catalogue = catalogue();
        let rows = search(&catalogue, &OwnershipLedger::new(), " ");
        assert_eq!(names(&rows), vec![
            "Angel of Dawn",
            "Bog Wraith",
            "Gobbling Ooze",
            "Goblin Guide"
        ]);
    }

    #[test]
    fn test_search_is_capped() {
        let csv = (0..15).fold("name,rarity,color_identity\n".to_owned(), |mut csv, i| {
            csv.push_str(&format!("Card {i},common,W\n"));
            csv
        });
        let catalogue = Catalogue::from_csv_str("TST", &csv).unwrap();
        let rows = search(&catalogue, &OwnershipLedger::new(), "card");
        assert_eq!(rows.len(), SEARCH_LIMIT);
        assert_eq!(rows[0].name, "Card 0");
        assert!(rows[0].ratings.is_none());
        assert_eq!(search(&catalogue, &OwnershipLedger::new(), "").len(), 15);
    }
}
