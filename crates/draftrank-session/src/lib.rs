//! Draft session orchestration.
//!
//! [`DraftEngine`](engine::DraftEngine) is the single entry point for the
//! presentation layer. It owns:
//!
//! - the [`EngineConfig`](config::EngineConfig) and the [`SetRegistry`](set_registry::SetRegistry)
//!   that locates card lists and scoring models on disk
//! - the active [`DraftSession`](session::DraftSession), rebuilt on every set change
//! - the scoring model of the active set
//!
//! Commands (`pick`, `remove`, `set_filter`, `new_draft`, ...) mutate the session
//! and funnel into one recompute. Views over the committed ratings live in
//! [`view`].
//!
//! # Example
//!
//! ```no_run
//! use draftrank_session::{config::EngineConfig, engine::DraftEngine};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = DraftEngine::new(EngineConfig::default());
//! engine.on_set_change("BLB").await?;
//! engine.pick("Lightshell Duo").await?;
//!
//! let session = engine.session().unwrap();
//! if let Some(snapshot) = session.pick_order().snapshot() {
//!     for row in &snapshot.rows {
//!         println!("{} {:.1}", row.name, row.ratings.rating);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod session;
pub mod set_registry;
pub mod view;
