use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    card::{CardRatings, CardRecord, ColorIdentity, ParseRarityError, Rarity},
    csv::{CsvError, CsvTable},
};

pub const NAME_COLUMN: &str = "name";
pub const RARITY_COLUMN: &str = "rarity";
pub const COLOR_IDENTITY_COLUMN: &str = "color_identity";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CatalogueLoadError {
    #[display("failed to read card list {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed card list")]
    Csv(CsvError),
    #[display("card list has no '{column}' column")]
    MissingColumn { column: &'static str },
    #[display("line {line}: {source}")]
    InvalidRarity {
        line: usize,
        #[error(not(source))]
        source: ParseRarityError,
    },
    #[display("{at}: empty card name")]
    EmptyName { at: RecordLocation },
    #[display("{at}: duplicate card name '{name}'")]
    DuplicateName { at: RecordLocation, name: String },
}

/// Where an offending card record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RecordLocation {
    /// 1-based line in a card-list file.
    #[display("line {_0}")]
    Line(usize),
    /// 1-based position in a list of records built in memory.
    #[display("card {_0}")]
    Position(usize),
}

impl From<CsvError> for CatalogueLoadError {
    fn from(err: CsvError) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected ratings for {expected} cards, got {actual}")]
pub struct RatingsLengthMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// The ordered card list of one set, with a name lookup.
///
/// Catalogue order is significant: scoring vectors are aligned by catalogue
/// index, and ties in the pick order are broken by it.
///
/// The card metadata is immutable once loaded. The only mutable part is the
/// per-card [`CardRatings`], which is replaced wholesale by
/// [`Catalogue::commit_ratings`].
///
/// # Example
///
/// ```
/// use draftrank_catalogue::{Catalogue, Rarity};
///
/// let csv = "name,rarity,color_identity\nLightning Bolt,common,R\n\"Fire, Ice\",rare,UR\n";
/// let catalogue = Catalogue::from_csv_str("TST", csv).unwrap();
///
/// assert_eq!(catalogue.len(), 2);
/// assert_eq!(catalogue.index_of("Fire, Ice"), Some(1));
/// assert_eq!(catalogue.card("Lightning Bolt").unwrap().rarity(), Rarity::Common);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    set_code: String,
    cards: Vec<CardRecord>,
    index: HashMap<String, usize>,
    ratings_seq: Option<u64>,
}

impl Catalogue {
    /// Builds a catalogue from records in catalogue order.
    ///
    /// Card names must be unique and non-empty. Errors report the 1-based
    /// [`RecordLocation::Position`] of the offending record.
    pub fn new(
        set_code: impl Into<String>,
        cards: Vec<CardRecord>,
    ) -> Result<Self, CatalogueLoadError> {
        let records = cards
            .into_iter()
            .enumerate()
            .map(|(i, card)| Ok((RecordLocation::Position(i + 1), card)));
        Self::from_records(set_code, records)
    }

    fn from_records<I>(
        set_code: impl Into<String>,
        records: I,
    ) -> Result<Self, CatalogueLoadError>
    where
        I: IntoIterator<Item = Result<(RecordLocation, CardRecord), CatalogueLoadError>>,
    {
        let records = records.into_iter();
        let mut cards = Vec::with_capacity(records.size_hint().0);
        let mut index = HashMap::with_capacity(records.size_hint().0);
        for record in records {
            let (at, card) = record?;
            if card.name().is_empty() {
                return Err(CatalogueLoadError::EmptyName { at });
            }
            if index.insert(card.name().to_owned(), cards.len()).is_some() {
                return Err(CatalogueLoadError::DuplicateName {
                    at,
                    name: card.name().to_owned(),
                });
            }
            cards.push(card);
        }
        Ok(Self {
            set_code: set_code.into(),
            cards,
            index,
            ratings_seq: None,
        })
    }

    /// A catalogue with no cards, held after a failed load.
    #[must_use]
    pub fn empty(set_code: impl Into<String>) -> Self {
        Self {
            set_code: set_code.into(),
            ..Self::default()
        }
    }

    /// Parses a card list with `name`, `rarity` and `color_identity` columns.
    ///
    /// Other columns are ignored. Errors report the line of the offending row.
    pub fn from_csv_str(
        set_code: impl Into<String>,
        text: &str,
    ) -> Result<Self, CatalogueLoadError> {
        let table = CsvTable::parse(text)?;
        let column = |column: &'static str| {
            table
                .column(column)
                .ok_or(CatalogueLoadError::MissingColumn { column })
        };
        let name_col = column(NAME_COLUMN)?;
        let rarity_col = column(RARITY_COLUMN)?;
        let color_col = column(COLOR_IDENTITY_COLUMN)?;

        let records = table.records.iter().map(|record| {
            let line = record.line;
            let rarity = record
                .field(rarity_col)
                .parse::<Rarity>()
                .map_err(|source| CatalogueLoadError::InvalidRarity { line, source })?;
            let color_identity = ColorIdentity::new(record.field(color_col));
            let card = CardRecord::new(record.field(name_col), rarity, color_identity);
            Ok((RecordLocation::Line(line), card))
        });
        Self::from_records(set_code, records)
    }

    /// Reads and parses a card-list file.
    pub fn open<P>(set_code: impl Into<String>, path: P) -> Result<Self, CatalogueLoadError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogueLoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let catalogue = Self::from_csv_str(set_code, &text)?;
        tracing::info!(
            set = catalogue.set_code(),
            cards = catalogue.len(),
            path = %path.display(),
            "loaded card list"
        );
        Ok(catalogue)
    }

    #[must_use]
    pub fn set_code(&self) -> &str {
        &self.set_code
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CardRecord> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn card(&self, name: &str) -> Option<&CardRecord> {
        self.index_of(name).map(|i| &self.cards[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Card names in catalogue order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.cards.iter().map(CardRecord::name)
    }

    /// Sequence number of the recompute whose ratings are currently stored.
    #[must_use]
    pub fn ratings_seq(&self) -> Option<u64> {
        self.ratings_seq
    }

    /// Replaces the ratings of every card at once.
    ///
    /// `ratings` must be aligned with catalogue order and cover every card. On a
    /// length mismatch nothing is written.
    pub fn commit_ratings(
        &mut self,
        seq: u64,
        ratings: &[CardRatings],
    ) -> Result<(), RatingsLengthMismatch> {
        if ratings.len() != self.cards.len() {
            return Err(RatingsLengthMismatch {
                expected: self.cards.len(),
                actual: ratings.len(),
            });
        }
        for (card, ratings) in self.cards.iter_mut().zip(ratings) {
            card.set_ratings(*ratings);
        }
        self.ratings_seq = Some(seq);
        Ok(())
    }
}
