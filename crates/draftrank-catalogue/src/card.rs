use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Card rarity as printed in the set's card list.
///
/// `Special` is kept as its own variant so it can be displayed distinctly, but it
/// is never a separate filter bucket: see [`Rarity::filter_bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Mythic,
        Rarity::Special,
    ];

    /// Rarity used when matching against a rarity filter.
    ///
    /// ```
    /// use draftrank_catalogue::Rarity;
    ///
    /// assert_eq!(Rarity::Special.filter_bucket(), Rarity::Mythic);
    /// assert_eq!(Rarity::Rare.filter_bucket(), Rarity::Rare);
    /// ```
    #[must_use]
    pub const fn filter_bucket(self) -> Rarity {
        match self {
            Rarity::Special => Rarity::Mythic,
            other => other,
        }
    }

    /// Lowercase identifier, as it appears in card lists.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
            Rarity::Special => "special",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Mythic => "Mythic",
            Rarity::Special => "Special",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown rarity '{value}'")]
pub struct ParseRarityError {
    pub value: String,
}

impl FromStr for Rarity {
    type Err = ParseRarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseRarityError {
                value: value.to_owned(),
            })
    }
}

/// Color-combination tag of a card (e.g. `W`, `UB`, `C`).
///
/// Tags are compared verbatim after trimming; the card list decides the
/// vocabulary.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct ColorIdentity(String);

impl ColorIdentity {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorIdentity {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Ratings derived for a card by the most recent committed recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardRatings {
    /// Rating in the current ownership context.
    pub rating: f64,
    /// Rating against an empty ownership context.
    pub baseline_rating: f64,
    /// `rating - baseline_rating`.
    pub synergy: f64,
}

impl CardRatings {
    #[must_use]
    pub fn new(rating: f64, baseline_rating: f64) -> Self {
        Self {
            rating,
            baseline_rating,
            synergy: rating - baseline_rating,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rating.is_finite() && self.baseline_rating.is_finite() && self.synergy.is_finite()
    }
}

/// One card of a set's card list.
///
/// Records are owned by the [`Catalogue`](crate::Catalogue); everything else
/// refers to cards by name or catalogue index.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    name: String,
    rarity: Rarity,
    color_identity: ColorIdentity,
    ratings: Option<CardRatings>,
}

impl CardRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: Rarity, color_identity: ColorIdentity) -> Self {
        Self {
            name: name.into(),
            rarity,
            color_identity,
            ratings: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    #[must_use]
    pub fn color_identity(&self) -> &ColorIdentity {
        &self.color_identity
    }

    /// Ratings from the last committed recompute, or `None` before the first one.
    #[must_use]
    pub fn ratings(&self) -> Option<&CardRatings> {
        self.ratings.as_ref()
    }

    pub(crate) fn set_ratings(&mut self, ratings: CardRatings) {
        self.ratings = Some(ratings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rarity_case_insensitive() {
        assert_eq!("Common".parse::<Rarity>().unwrap(), Rarity::Common);
        assert_eq!(" MYTHIC ".parse::<Rarity>().unwrap(), Rarity::Mythic);
        assert_eq!("special".parse::<Rarity>().unwrap(), Rarity::Special);
    }

    #[test]
    fn test_parse_rarity_unknown() {
        let err = "basic".parse::<Rarity>().unwrap_err();
        assert_eq!(err.value, "basic");
        assert_eq!(err.to_string(), "unknown rarity 'basic'");
    }

    #[test]
    fn test_special_label_is_distinct() {
        assert_eq!(Rarity::Special.label(), "Special");
        assert_ne!(Rarity::Special.label(), Rarity::Mythic.label());
        assert_eq!(Rarity::Special.filter_bucket(), Rarity::Mythic);
    }

    #[test]
    fn test_rarity_serde() {
        let json = serde_json::to_string(&Rarity::Uncommon).unwrap();
        assert_eq!(json, "\"uncommon\"");
    }

    #[test]
    fn test_color_identity_trimmed() {
        assert_eq!(ColorIdentity::new(" WU "), ColorIdentity::from("WU"));
        assert_eq!(ColorIdentity::new("B").to_string(), "B");
    }

    #[test]
    fn test_card_ratings_synergy() {
        let ratings = CardRatings::new(61.5, 55.0);
        assert!((ratings.synergy - 6.5).abs() < 1e-12);
        assert!(ratings.is_finite());
    }
}
