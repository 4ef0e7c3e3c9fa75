use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use draftrank_catalogue::{ColorIdentity, Rarity};
use draftrank_evaluator::{
    filter::{FilterSelection, PickLimit},
    pick_order::RatingSnapshot,
};
use draftrank_session::{engine::DraftEngine, view::PickOrderView};
use serde::Serialize;

use super::GlobalArg;
use crate::{table, util};

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct RankArg {
    /// Set code (defaults to the newest set with a model)
    #[arg(long)]
    set: Option<String>,
    /// A picked card; repeat for multiple copies or cards
    #[arg(long = "pick", value_name = "NAME")]
    picks: Vec<String>,
    /// JSON file with an array of picked card names
    #[arg(long, value_name = "FILE")]
    picks_file: Option<PathBuf>,
    /// Only show these rarities (common, uncommon, rare, mythic, special)
    #[arg(long = "rarity", value_name = "RARITY")]
    rarities: Vec<Rarity>,
    /// Only show these color identities (e.g. W, UB, C)
    #[arg(long = "color", value_name = "COLOR")]
    colors: Vec<String>,
    /// Rows to show: a number, `all`, or `deck`
    #[arg(long)]
    limit: Option<PickLimit>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl RankArg {
    fn selection(&self, default_limit: usize) -> FilterSelection {
        let mut selection = FilterSelection::new()
            .with_limit(self.limit.unwrap_or(PickLimit::Top(default_limit)));
        for rarity in &self.rarities {
            selection = selection.with_rarity(*rarity);
        }
        for color in &self.colors {
            selection = selection.with_color(color.to_ascii_uppercase().as_str());
        }
        selection
    }
}

#[derive(Debug, Serialize)]
struct RankReport<'a> {
    set: &'a str,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_warning: Option<&'a str>,
    matched: usize,
    rows: Vec<RankRow<'a>>,
}

#[derive(Debug, Serialize)]
struct RankRow<'a> {
    rank: usize,
    name: &'a str,
    rarity: Rarity,
    color_identity: &'a ColorIdentity,
    owned: u32,
    rating: f64,
    baseline_rating: f64,
    synergy: f64,
}

impl<'a> RankReport<'a> {
    fn new(set: &'a str, model_warning: Option<&'a str>, snapshot: &'a RatingSnapshot) -> Self {
        let rows = snapshot
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RankRow {
                rank: i + 1,
                name: &row.name,
                rarity: row.rarity,
                color_identity: &row.color_identity,
                owned: row.owned,
                rating: row.ratings.rating,
                baseline_rating: row.ratings.baseline_rating,
                synergy: row.ratings.synergy,
            })
            .collect();
        Self {
            set,
            source: snapshot.current_source.to_string(),
            model_warning,
            matched: snapshot.matched,
            rows,
        }
    }
}

pub(crate) async fn run(global: &GlobalArg, arg: &RankArg) -> anyhow::Result<()> {
    let mut engine = global.start_engine(arg.set.as_deref()).await?;
    let session = engine.session().context("No set loaded")?;
    if let Some(error) = session.load_error() {
        anyhow::bail!("Failed to load card list for {}: {error}", session.set_code());
    }

    let mut picks = arg.picks.clone();
    if let Some(path) = &arg.picks_file {
        picks.extend(util::read_picks_file(path)?);
    }
    apply_picks(&mut engine, &picks).await?;

    let selection = arg.selection(engine.config().default_limit);
    engine.set_filter(selection).await?;

    let session = engine.session().context("No set loaded")?;
    let mut output = util::Output::from_output_path(arg.output.as_deref())?;
    match session.pick_order() {
        PickOrderView::Ready(snapshot) if arg.json => {
            let report = RankReport::new(session.set_code(), session.model_warning(), snapshot);
            output.write_json(&report)?;
        }
        PickOrderView::Degraded { message } => anyhow::bail!("{message}"),
        pick_order => {
            if let Some(warning) = session.model_warning() {
                writeln!(output, "warning: {warning}")?;
            }
            writeln!(
                output,
                "Pick order for {} ({} picks)",
                session.set_code(),
                session.ledger().total_owned()
            )?;
            table::write_pick_order(&mut output, pick_order)?;
            output.finish()?;
        }
    }
    Ok(())
}

async fn apply_picks(engine: &mut DraftEngine, picks: &[String]) -> anyhow::Result<()> {
    for name in picks {
        let session = engine.session().context("No set loaded")?;
        let name = super::resolve_card_name(session.catalogue(), name);
        engine
            .pick(&name)
            .await
            .with_context(|| format!("Failed to pick '{name}'"))?;
    }
    Ok(())
}
