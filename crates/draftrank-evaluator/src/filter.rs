//! Which cards appear in the pick order.

use std::{collections::BTreeSet, fmt, str::FromStr};

use draftrank_catalogue::{CardRecord, Catalogue, ColorIdentity, OwnershipLedger, Rarity};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 10;

/// How many rows the pick order shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickLimit {
    /// The `n` best-rated cards.
    Top(usize),
    /// Every card that passes the filters.
    All,
    /// Only owned cards, every one of them.
    DeckOnly,
}

impl Default for PickLimit {
    fn default() -> Self {
        Self::Top(DEFAULT_LIMIT)
    }
}

impl fmt::Display for PickLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickLimit::Top(n) => write!(f, "{n}"),
            PickLimit::All => f.write_str("all"),
            PickLimit::DeckOnly => f.write_str("deck"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid limit '{value}': expected a number, 'all' or 'deck'")]
pub struct ParseLimitError {
    pub value: String,
}

impl FromStr for PickLimit {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(PickLimit::All),
            "deck" | "deck-only" | "deck_only" => Ok(PickLimit::DeckOnly),
            n => n.parse().map(PickLimit::Top).map_err(|_| ParseLimitError {
                value: s.to_owned(),
            }),
        }
    }
}

/// What deck-only mode does to the rarity and color selection.
///
/// Filtering is the same either way: deck-only ignores the selection. The
/// setting only decides whether the selection is remembered for when deck-only
/// mode is left, or replaced by "everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckOnlyDisplay {
    #[default]
    KeepSelection,
    SelectAll,
}

/// The active rarity, color and limit selection.
///
/// An empty rarity or color set imposes no constraint on that axis. Rarities
/// are stored by [`Rarity::filter_bucket`], so selecting `Special` and
/// `Mythic` is the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    rarities: BTreeSet<Rarity>,
    colors: BTreeSet<ColorIdentity>,
    limit: PickLimit,
}

impl FilterSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarities.insert(rarity.filter_bucket());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<ColorIdentity>) -> Self {
        self.colors.insert(color.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: PickLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Adds or removes `rarity`; returns whether it is now selected.
    pub fn toggle_rarity(&mut self, rarity: Rarity) -> bool {
        let bucket = rarity.filter_bucket();
        if self.rarities.remove(&bucket) {
            false
        } else {
            self.rarities.insert(bucket)
        }
    }

    /// Adds or removes `color`; returns whether it is now selected.
    pub fn toggle_color(&mut self, color: ColorIdentity) -> bool {
        if self.colors.remove(&color) {
            false
        } else {
            self.colors.insert(color)
        }
    }

    pub fn clear_rarities(&mut self) {
        self.rarities.clear();
    }

    pub fn clear_colors(&mut self) {
        self.colors.clear();
    }

    pub fn set_limit(&mut self, limit: PickLimit) {
        self.limit = limit;
    }

    #[must_use]
    pub fn rarities(&self) -> &BTreeSet<Rarity> {
        &self.rarities
    }

    #[must_use]
    pub fn colors(&self) -> &BTreeSet<ColorIdentity> {
        &self.colors
    }

    #[must_use]
    pub fn limit(&self) -> PickLimit {
        self.limit
    }

    #[must_use]
    pub fn is_deck_only(&self) -> bool {
        self.limit == PickLimit::DeckOnly
    }

    /// The selection as it should be reported under `display`.
    #[must_use]
    pub fn effective(&self, display: DeckOnlyDisplay) -> FilterSelection {
        match (self.is_deck_only(), display) {
            (true, DeckOnlyDisplay::SelectAll) => FilterSelection::new().with_limit(self.limit),
            _ => self.clone(),
        }
    }

    /// Whether `card` passes the rarity and color constraints.
    #[must_use]
    pub fn matches(&self, card: &CardRecord) -> bool {
        let rarity_ok =
            self.rarities.is_empty() || self.rarities.contains(&card.rarity().filter_bucket());
        let color_ok = self.colors.is_empty() || self.colors.contains(card.color_identity());
        rarity_ok && color_ok
    }
}

/// Catalogue indices of the cards shown under `selection`, in catalogue order.
///
/// In deck-only mode that is exactly the owned cards; otherwise the cards
/// passing both the rarity and color constraints. The limit is applied after
/// sorting, not here.
#[must_use]
pub fn filter_indices(
    catalogue: &Catalogue,
    ledger: &OwnershipLedger,
    selection: &FilterSelection,
) -> Vec<usize> {
    let keep = |card: &CardRecord| {
        if selection.is_deck_only() {
            ledger.is_owned(card.name())
        } else {
            selection.matches(card)
        }
    };
    catalogue
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, card)| keep(card))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        Catalogue::from_csv_str(
            "TST",
            "\
name,rarity,color_identity
A,common,W
B,uncommon,U
C,rare,W
D,mythic,B
E,special,W
",
        )
        .unwrap()
    }

    #[test]
    fn test_no_constraints_keeps_everything() {
        let indices =
            filter_indices(&catalogue(), &OwnershipLedger::new(), &FilterSelection::new());
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rarity_and_color_are_combined() {
        let selection = FilterSelection::new()
            .with_rarity(Rarity::Common)
            .with_rarity(Rarity::Rare)
            .with_color("W");
        let indices = filter_indices(&catalogue(), &OwnershipLedger::new(), &selection);
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_special_shares_mythic_bucket() {
        let selection = FilterSelection::new().with_rarity(Rarity::Mythic);
        let indices = filter_indices(&catalogue(), &OwnershipLedger::new(), &selection);
        assert_eq!(indices, vec![3, 4]);

        let selection = FilterSelection::new().with_rarity(Rarity::Special);
        assert_eq!(selection.rarities().iter().copied().collect::<Vec<_>>(), vec![
            Rarity::Mythic
        ]);
    }

    #[test]
    fn test_deck_only_ignores_selection() {
        let mut ledger = OwnershipLedger::new();
        ledger.pick("B");
        ledger.pick("D");
        let selection = FilterSelection::new()
            .with_rarity(Rarity::Common)
            .with_limit(PickLimit::DeckOnly);
        let indices = filter_indices(&catalogue(), &ledger, &selection);
        assert_eq!(indices, vec![1, 3]);

        let empty = filter_indices(&catalogue(), &OwnershipLedger::new(), &selection);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_effective_selection_in_deck_only() {
        let selection = FilterSelection::new()
            .with_color("W")
            .with_limit(PickLimit::DeckOnly);
        assert_eq!(selection.effective(DeckOnlyDisplay::KeepSelection), selection);

        let all = selection.effective(DeckOnlyDisplay::SelectAll);
        assert!(all.colors().is_empty());
        assert!(all.is_deck_only());

        let top = FilterSelection::new().with_color("W");
        assert_eq!(top.effective(DeckOnlyDisplay::SelectAll), top);
    }

    #[test]
    fn test_toggle() {
        let mut selection = FilterSelection::new();
        assert!(selection.toggle_rarity(Rarity::Special));
        assert!(!selection.toggle_rarity(Rarity::Mythic));
        assert!(selection.rarities().is_empty());

        assert!(selection.toggle_color("UB".into()));
        assert!(!selection.toggle_color("UB".into()));
        assert!(selection.colors().is_empty());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!("5".parse(), Ok(PickLimit::Top(5)));
        assert_eq!(" ALL ".parse(), Ok(PickLimit::All));
        assert_eq!("deck".parse(), Ok(PickLimit::DeckOnly));
        assert!("-1".parse::<PickLimit>().is_err());
        assert!("ten".parse::<PickLimit>().is_err());
        assert_eq!(PickLimit::default().to_string(), "10");
    }
}
