use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use draftrank_catalogue::Catalogue;
use draftrank_session::{config::EngineConfig, engine::DraftEngine, set_registry::DraftMode};

use self::{draft::DraftArg, rank::RankArg, sets::SetsArg};

mod draft;
mod rank;
mod sets;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    global: GlobalArg,
    /// What to do (defaults to an interactive draft)
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct GlobalArg {
    /// Engine configuration file (JSON)
    #[arg(long, global = true, env = "DRAFTRANK_CONFIG")]
    config: Option<PathBuf>,
    /// Directory containing `cards/` and `models/`
    #[arg(long, global = true, env = "DRAFTRANK_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Event format of the scoring models (premier, trad, pick_two, pick_two_trad)
    #[arg(long, global = true, env = "DRAFTRANK_MODE")]
    mode: Option<DraftMode>,
}

impl GlobalArg {
    /// The config file (or defaults), with command-line overrides applied.
    pub(crate) fn load_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::open(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir.clone_from(data_dir);
        }
        if let Some(mode) = self.mode {
            config.draft_mode = mode;
        }
        Ok(config)
    }

    /// An engine with `set` (or the newest available set) loaded.
    pub(crate) async fn start_engine(&self, set: Option<&str>) -> anyhow::Result<DraftEngine> {
        let mut engine = DraftEngine::new(self.load_config()?);
        let set = match set {
            Some(set) => set.to_uppercase(),
            None => engine
                .registry()
                .default_set()
                .map(str::to_owned)
                .with_context(|| {
                    format!(
                        "No {} models found under {}",
                        engine.registry().mode(),
                        engine.registry().data_dir().display()
                    )
                })?,
        };
        engine.on_set_change(&set).await?;
        Ok(engine)
    }
}

/// The catalogue spelling of `name`, matched case-insensitively.
///
/// Unknown names are returned as typed so the engine can reject them.
pub(crate) fn resolve_card_name(catalogue: &Catalogue, name: &str) -> String {
    let name = name.trim();
    if catalogue.contains(name) {
        return name.to_owned();
    }
    let lower = name.to_lowercase();
    catalogue
        .names()
        .find(|candidate| candidate.to_lowercase() == lower)
        .unwrap_or(name)
        .to_owned()
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// List sets that have a scoring model, newest first
    Sets(#[clap(flatten)] SetsArg),
    /// Print the pick order for a set and a list of picks
    Rank(#[clap(flatten)] RankArg),
    /// Draft interactively
    Draft(#[clap(flatten)] DraftArg),
}

pub async fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Draft(DraftArg::default())) {
        Mode::Sets(arg) => sets::run(&args.global, &arg)?,
        Mode::Rank(arg) => rank::run(&args.global, &arg).await?,
        Mode::Draft(arg) => draft::run(&args.global, &arg).await?,
    }
    Ok(())
}
