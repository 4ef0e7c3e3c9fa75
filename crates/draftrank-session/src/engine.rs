//! Command entry points and recompute sequencing.
//!
//! Every state-changing command ends in a recompute. A recompute is split in
//! three steps so the slow part can run without holding the engine:
//!
//! ```text
//! prepare_recompute (&mut self) ──▶ RecomputeJob::run (owned, async) ──▶ apply (&mut self)
//! ```
//!
//! Each prepared job takes the next sequence number. [`DraftEngine::apply`]
//! only commits a result whose number is still the latest; anything older is
//! dropped as [`ApplyOutcome::Superseded`], so a slow scoring call can never
//! overwrite the result of a newer command.

use std::error::Error;

use draftrank_catalogue::Catalogue;
use draftrank_evaluator::{
    filter::{FilterSelection, PickLimit},
    pick_order::{self, PickOrderBuilder, RatedCards},
    scoring_adapter::{self, ScoringAdapter},
    scoring_model::{ModelInputs, SharedScoringModel},
};

use crate::{
    config::EngineConfig,
    session::{DraftSession, SessionError},
    set_registry::SetRegistry,
    view::PickOrderView,
};

/// Result of applying a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ApplyOutcome {
    /// The snapshot and ratings were committed.
    Applied { seq: u64 },
    /// The recompute failed; the pick order now shows an error.
    Degraded { seq: u64 },
    /// A newer recompute was prepared; nothing was changed.
    Superseded { seq: u64, latest: u64 },
}

/// A prepared recompute, detached from the engine.
#[derive(Debug, Clone)]
pub struct RecomputeJob {
    seq: u64,
    builder: PickOrderBuilder,
    inputs: ModelInputs,
}

impl RecomputeJob {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Scores and normalizes; the result is committed by [`DraftEngine::apply`].
    pub async fn run(self) -> RatedCards {
        tracing::debug!(seq = self.seq, cards = self.inputs.len(), "running recompute");
        self.builder.rate(self.seq, self.inputs).await
    }
}

#[derive(Debug)]
pub struct DraftEngine {
    config: EngineConfig,
    registry: SetRegistry,
    session: Option<DraftSession>,
    builder: PickOrderBuilder,
    latest_seq: u64,
}

impl DraftEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let registry = SetRegistry::from_config(&config);
        Self {
            config,
            registry,
            session: None,
            builder: PickOrderBuilder::default(),
            latest_seq: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &SetRegistry {
        &self.registry
    }

    /// The active session, once a set has been selected.
    #[must_use]
    pub fn session(&self) -> Option<&DraftSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.builder.adapter().has_model()
    }

    /// Sequence number of the most recently prepared recompute.
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// The filter selection as it should be reported to the user.
    #[must_use]
    pub fn effective_selection(&self) -> Option<FilterSelection> {
        self.session
            .as_ref()
            .map(|s| s.effective_selection(self.config.deck_only_display))
    }

    /// Replaces the session with a fresh one for `set_code`.
    ///
    /// A card list that fails to load leaves an empty session carrying the
    /// error. A model that fails to load leaves the session unscored (neutral
    /// ratings) with a warning. The filter selection carries over.
    pub async fn on_set_change(&mut self, set_code: &str) -> Result<ApplyOutcome, SessionError> {
        let selection = self.session.as_ref().map_or_else(
            || FilterSelection::new().with_limit(PickLimit::Top(self.config.default_limit)),
            |s| s.selection().clone(),
        );

        let card_list = self.registry.card_list_path(set_code);
        let mut session = match Catalogue::open(set_code, &card_list) {
            Ok(catalogue) => DraftSession::new(catalogue, selection),
            Err(e) => {
                let message = error_chain(&e);
                tracing::warn!(set = set_code, error = %message, "card list unavailable");
                DraftSession::failed(set_code, selection, message)
            }
        };

        let model = self.open_model(&mut session, set_code).await;
        self.builder = PickOrderBuilder::new(ScoringAdapter::new(
            model,
            self.config.output_keys.clone(),
            self.config.inference_timeout(),
        ));
        self.session = Some(session);
        tracing::info!(set = set_code, model = self.has_model(), "started new draft session");

        self.recompute().await
    }

    async fn open_model(
        &self,
        session: &mut DraftSession,
        set_code: &str,
    ) -> Option<SharedScoringModel> {
        let path = self.registry.model_path(set_code);
        match scoring_adapter::open_model(path, self.config.model_load_timeout()).await {
            Ok(model) => {
                let cards = session.catalogue().len();
                if model.input_len() != cards {
                    let warning = format!(
                        "scoring model covers {} cards but the card list has {cards}",
                        model.input_len()
                    );
                    tracing::warn!(set = set_code, %warning, "model does not match card list");
                    session.set_model_warning(Some(warning));
                }
                Some(model)
            }
            Err(e) => {
                let warning = error_chain(&e);
                tracing::warn!(set = set_code, error = %warning, "scoring model unavailable");
                session.set_model_warning(Some(warning));
                None
            }
        }
    }

    /// Adds one copy of `name` to the collection; returns the new count.
    pub async fn pick(&mut self, name: &str) -> Result<u32, SessionError> {
        let session = self.session_mut()?;
        session.validate_card(name)?;
        let count = session.ledger_mut().pick(name);
        tracing::debug!(card = name, count, "picked");
        self.recompute().await?;
        Ok(count)
    }

    /// Removes one copy of `name`; returns the remaining count.
    ///
    /// Removing a card that is not owned returns `None`. Like any remove it
    /// still clears the compare set and recomputes.
    pub async fn remove(&mut self, name: &str) -> Result<Option<u32>, SessionError> {
        let session = self.session_mut()?;
        session.validate_card(name)?;
        let remaining = session.ledger_mut().remove(name);
        tracing::debug!(card = name, ?remaining, "removed");
        self.recompute().await?;
        Ok(remaining)
    }

    /// Stages `name` for comparison. Ratings do not change, so nothing is recomputed.
    pub fn stage_compare(&mut self, name: &str) -> Result<bool, SessionError> {
        let session = self.session_mut()?;
        session.validate_card(name)?;
        Ok(session.ledger_mut().stage_compare(name))
    }

    pub fn unstage_compare(&mut self, name: &str) -> Result<bool, SessionError> {
        let session = self.session_mut()?;
        session.validate_card(name)?;
        Ok(session.ledger_mut().unstage_compare(name))
    }

    /// Picks a staged card. Like any pick, this clears the compare set.
    pub async fn pick_from_compare(&mut self, name: &str) -> Result<u32, SessionError> {
        let session = self.session_mut()?;
        session.validate_card(name)?;
        if !session.ledger().is_staged(name) {
            return Err(SessionError::NotStaged {
                name: name.to_owned(),
            });
        }
        self.pick(name).await
    }

    pub async fn set_filter(
        &mut self,
        selection: FilterSelection,
    ) -> Result<ApplyOutcome, SessionError> {
        *self.session_mut()?.selection_mut() = selection;
        self.recompute().await
    }

    /// Clears the collection and the compare set of the current set.
    pub async fn new_draft(&mut self) -> Result<ApplyOutcome, SessionError> {
        self.session_mut()?.ledger_mut().reset();
        tracing::info!("started new draft");
        self.recompute().await
    }

    /// Prepares, runs and applies one recompute.
    pub async fn recompute(&mut self) -> Result<ApplyOutcome, SessionError> {
        let job = self.prepare_recompute()?;
        let rated = job.run().await;
        Ok(self.apply(rated))
    }

    /// Captures the current ownership state under a new sequence number.
    pub fn prepare_recompute(&mut self) -> Result<RecomputeJob, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoSet)?;
        self.latest_seq += 1;
        Ok(RecomputeJob {
            seq: self.latest_seq,
            builder: self.builder.clone(),
            inputs: ModelInputs::from_ledger(session.catalogue(), session.ledger()),
        })
    }

    /// Commits `rated` if it belongs to the latest prepared recompute.
    pub fn apply(&mut self, rated: RatedCards) -> ApplyOutcome {
        let seq = rated.seq;
        let latest = self.latest_seq;
        let session = match self.session.as_mut() {
            Some(session) if seq == latest => session,
            _ => {
                tracing::debug!(seq, latest, "discarding superseded recompute");
                return ApplyOutcome::Superseded { seq, latest };
            }
        };

        let (catalogue, ledger, selection) = session.parts_mut();
        match pick_order::build_snapshot(catalogue, ledger, selection, rated) {
            Ok(snapshot) => {
                tracing::debug!(
                    seq,
                    rows = snapshot.rows.len(),
                    matched = snapshot.matched,
                    degraded = snapshot.is_degraded(),
                    "committed recompute"
                );
                session.set_pick_order(PickOrderView::Ready(snapshot));
                ApplyOutcome::Applied { seq }
            }
            Err(e) => {
                tracing::error!(seq, error = %e, "recompute failed");
                session.set_pick_order(PickOrderView::Degraded {
                    message: format!("Error updating pick order: {e}"),
                });
                ApplyOutcome::Degraded { seq }
            }
        }
    }

    fn session_mut(&mut self) -> Result<&mut DraftSession, SessionError> {
        self.session.as_mut().ok_or(SessionError::NoSet)
    }
}

/// `err` and its sources, joined with `": "`.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        message.push_str(": ");
        message.push_str(&e.to_string());
        source = e.source();
    }
    message
}
