//! Card data and ownership state for a booster draft.
//!
//! This crate provides the data model the rating engine works on:
//!
//! - [`Catalogue`] - The immutable, ordered card list of one set plus a name lookup
//! - [`CardRecord`] - Name, [`Rarity`] and [`ColorIdentity`] of one card, plus the
//!   [`CardRatings`] from the latest committed recompute
//! - [`OwnershipLedger`] - Cards picked so far and cards staged for comparison
//! - [`csv`] - The card-list reader used by [`Catalogue::from_csv_str`]
//!
//! # Example
//!
//! ```
//! use draftrank_catalogue::{Catalogue, OwnershipLedger};
//!
//! let catalogue = Catalogue::from_csv_str(
//!     "TST",
//!     "name,rarity,color_identity\nA,common,W\nB,rare,U\n",
//! )
//! .unwrap();
//!
//! let mut ledger = OwnershipLedger::new();
//! ledger.stage_compare("B");
//! ledger.pick("A");
//!
//! assert_eq!(ledger.count("A"), 1);
//! assert!(!ledger.is_staged("B")); // picking clears the compare set
//! assert!(catalogue.contains("A"));
//! ```

pub use self::{card::*, catalogue::*, ledger::*};

mod card;
mod catalogue;
pub mod csv;
mod ledger;
