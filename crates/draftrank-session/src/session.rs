use draftrank_catalogue::{Catalogue, OwnershipLedger};
use draftrank_evaluator::filter::{DeckOnlyDisplay, FilterSelection};

use crate::view::{self, CardView, PickOrderView};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("no card named '{name}' in {set_code}")]
    UnknownCard { name: String, set_code: String },
    #[display("'{name}' is not staged for comparison")]
    NotStaged { name: String },
    #[display("no set is selected")]
    NoSet,
}

/// All state of one draft of one set.
///
/// A session is created when a set is selected and dropped when another set
/// is selected. Nothing in it outlives the set change.
#[derive(Debug, Clone)]
pub struct DraftSession {
    catalogue: Catalogue,
    ledger: OwnershipLedger,
    selection: FilterSelection,
    pick_order: PickOrderView,
    load_error: Option<String>,
    model_warning: Option<String>,
}

impl DraftSession {
    #[must_use]
    pub fn new(catalogue: Catalogue, selection: FilterSelection) -> Self {
        Self {
            catalogue,
            ledger: OwnershipLedger::new(),
            selection,
            pick_order: PickOrderView::Pending,
            load_error: None,
            model_warning: None,
        }
    }

    /// A session over an empty catalogue, kept after the card list failed to load.
    #[must_use]
    pub fn failed(set_code: &str, selection: FilterSelection, error: String) -> Self {
        Self {
            load_error: Some(error),
            ..Self::new(Catalogue::empty(set_code), selection)
        }
    }

    #[must_use]
    pub fn set_code(&self) -> &str {
        self.catalogue.set_code()
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn ledger(&self) -> &OwnershipLedger {
        &self.ledger
    }

    #[must_use]
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// The selection as reported to the user under `display`.
    #[must_use]
    pub fn effective_selection(&self, display: DeckOnlyDisplay) -> FilterSelection {
        self.selection.effective(display)
    }

    #[must_use]
    pub fn pick_order(&self) -> &PickOrderView {
        &self.pick_order
    }

    /// Why the card list could not be loaded, if it could not.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Why the scoring model could not be loaded, if it could not.
    #[must_use]
    pub fn model_warning(&self) -> Option<&str> {
        self.model_warning.as_deref()
    }

    #[must_use]
    pub fn deck_rows(&self) -> Vec<CardView> {
        view::deck_rows(&self.catalogue, &self.ledger)
    }

    #[must_use]
    pub fn compare_rows(&self) -> Vec<CardView> {
        view::compare_rows(&self.catalogue, &self.ledger)
    }

    #[must_use]
    pub fn search(&self, query: &str) -> Vec<CardView> {
        view::search(&self.catalogue, &self.ledger, query)
    }

    /// Checks that `name` is a card of this set.
    pub fn validate_card(&self, name: &str) -> Result<(), SessionError> {
        if self.catalogue.contains(name) {
            Ok(())
        } else {
            Err(SessionError::UnknownCard {
                name: name.to_owned(),
                set_code: self.set_code().to_owned(),
            })
        }
    }

    pub(crate) fn set_model_warning(&mut self, warning: Option<String>) {
        self.model_warning = warning;
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut OwnershipLedger {
        &mut self.ledger
    }

    pub(crate) fn selection_mut(&mut self) -> &mut FilterSelection {
        &mut self.selection
    }

    pub(crate) fn set_pick_order(&mut self, pick_order: PickOrderView) {
        self.pick_order = pick_order;
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Catalogue, &OwnershipLedger, &FilterSelection) {
        (&mut self.catalogue, &self.ledger, &self.selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_card() {
        let catalogue =
            Catalogue::from_csv_str("TST", "name,rarity,color_identity\nA,common,W\n").unwrap();
        let session = DraftSession::new(catalogue, FilterSelection::new());
        assert!(session.validate_card("A").is_ok());
        assert_eq!(
            session.validate_card("a").unwrap_err().to_string(),
            "no card named 'a' in TST"
        );
        assert!(session.pick_order().is_pending());
    }

    #[test]
    fn test_failed_session() {
        let session = DraftSession::failed("TST", FilterSelection::new(), "boom".to_owned());
        assert_eq!(session.set_code(), "TST");
        assert!(session.catalogue().is_empty());
        assert_eq!(session.load_error(), Some("boom"));
        assert!(session.search("").is_empty());
    }
}
