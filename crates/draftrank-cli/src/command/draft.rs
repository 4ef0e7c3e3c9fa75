use std::{
    io::{self, Write},
    ops::ControlFlow,
    str::FromStr,
};

use anyhow::Context as _;
use draftrank_catalogue::{ColorIdentity, ParseRarityError, Rarity};
use draftrank_evaluator::filter::{FilterSelection, ParseLimitError, PickLimit};
use draftrank_session::engine::DraftEngine;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use super::GlobalArg;
use crate::table;

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct DraftArg {
    /// Set code (defaults to the newest set with a model)
    #[arg(long)]
    set: Option<String>,
}

const HELP: &str = "\
Commands:
  pick NAME          add one copy of a card to your picks
  remove NAME        remove one copy of a card from your picks
  compare [NAME]     stage a card for comparison, or list staged cards
  uncompare NAME     unstage a card
  take NAME          pick a staged card and clear the compare list
  rarity R|clear     toggle a rarity filter (common, uncommon, rare, mythic)
  color C|clear      toggle a color identity filter (e.g. W, UB, C)
  limit N|all|deck   rows to show; `deck` shows only your picks
  search [TEXT]      find cards by name
  deck               list your picks
  show               print the pick order
  set CODE           switch to another set (starts a new draft)
  sets               list sets with a scoring model
  new                start a new draft of the current set
  help               show this help
  quit               leave
";

/// One line of input at the draft prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DraftCommand {
    Pick(String),
    Remove(String),
    Compare(Option<String>),
    Uncompare(String),
    Take(String),
    /// `None` clears the rarity filter.
    Rarity(Option<Rarity>),
    /// `None` clears the color filter.
    Color(Option<ColorIdentity>),
    Limit(PickLimit),
    Search(String),
    Deck,
    Show,
    Set(String),
    Sets,
    New,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
enum ParseCommandError {
    #[display("unknown command '{command}' (type `help` for a list)")]
    Unknown { command: String },
    #[display("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[display("{_0}")]
    Rarity(#[error(not(source))] ParseRarityError),
    #[display("{_0}")]
    Limit(#[error(not(source))] ParseLimitError),
}

impl FromStr for DraftCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (command, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();
        let required = |command: &'static str, argument: &'static str| {
            if rest.is_empty() {
                Err(ParseCommandError::MissingArgument { command, argument })
            } else {
                Ok(rest.to_owned())
            }
        };
        let optional = || (!rest.is_empty()).then(|| rest.to_owned());
        let is_clear = rest.eq_ignore_ascii_case("clear");

        let command = match command.to_ascii_lowercase().as_str() {
            "pick" | "p" => DraftCommand::Pick(required("pick", "a card name")?),
            "remove" | "rm" => DraftCommand::Remove(required("remove", "a card name")?),
            "compare" | "c" => DraftCommand::Compare(optional()),
            "uncompare" | "uc" => DraftCommand::Uncompare(required("uncompare", "a card name")?),
            "take" => DraftCommand::Take(required("take", "a card name")?),
            "rarity" | "r" => {
                let rarity = required("rarity", "a rarity or `clear`")?;
                if is_clear {
                    DraftCommand::Rarity(None)
                } else {
                    DraftCommand::Rarity(Some(
                        rarity.parse().map_err(ParseCommandError::Rarity)?,
                    ))
                }
            }
            "color" | "colour" => {
                let color = required("color", "a color identity or `clear`")?;
                if is_clear {
                    DraftCommand::Color(None)
                } else {
                    DraftCommand::Color(Some(ColorIdentity::new(&color.to_ascii_uppercase())))
                }
            }
            "limit" | "l" => DraftCommand::Limit(
                required("limit", "a number, `all` or `deck`")?
                    .parse()
                    .map_err(ParseCommandError::Limit)?,
            ),
            "search" | "s" | "/" => DraftCommand::Search(rest.to_owned()),
            "deck" | "d" => DraftCommand::Deck,
            "show" | "order" | "" => DraftCommand::Show,
            "set" => DraftCommand::Set(required("set", "a set code")?),
            "sets" => DraftCommand::Sets,
            "new" => DraftCommand::New,
            "help" | "h" | "?" => DraftCommand::Help,
            "quit" | "exit" | "q" => DraftCommand::Quit,
            _ => {
                return Err(ParseCommandError::Unknown {
                    command: command.to_owned(),
                });
            }
        };
        Ok(command)
    }
}

pub(crate) async fn run(global: &GlobalArg, arg: &DraftArg) -> anyhow::Result<()> {
    let mut engine = global.start_engine(arg.set.as_deref()).await?;
    let mut stdout = io::stdout();
    write_status(&mut stdout, &engine)?;
    writeln!(stdout, "Type `help` for a list of commands.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let set = engine.session().map_or("", |s| s.set_code());
        write!(stdout, "{set}> ")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            writeln!(stdout)?;
            break;
        };
        let command = match line.parse::<DraftCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(stdout, "error: {e}")?;
                continue;
            }
        };
        tracing::debug!(?command, "draft command");
        match execute(&mut engine, command, &mut stdout).await {
            Ok(ControlFlow::Continue(())) => {}
            Ok(ControlFlow::Break(())) => break,
            Err(e) => writeln!(stdout, "error: {e:#}")?,
        }
    }
    Ok(())
}

async fn execute<W>(
    engine: &mut DraftEngine,
    command: DraftCommand,
    out: &mut W,
) -> anyhow::Result<ControlFlow<()>>
where
    W: Write,
{
    match command {
        DraftCommand::Pick(name) => {
            let name = resolve(engine, &name);
            let count = engine.pick(&name).await?;
            writeln!(out, "Picked {name} (x{count})")?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Remove(name) => {
            let name = resolve(engine, &name);
            match engine.remove(&name).await? {
                Some(remaining) => {
                    writeln!(out, "Removed {name} ({remaining} left)")?;
                    write_pick_order(out, engine)?;
                }
                None => writeln!(out, "{name} is not in your picks")?,
            }
        }
        DraftCommand::Compare(Some(name)) => {
            let name = resolve(engine, &name);
            if engine.stage_compare(&name)? {
                writeln!(out, "Staged {name}")?;
            } else {
                writeln!(out, "{name} is already staged")?;
            }
            write_compare(out, engine)?;
        }
        DraftCommand::Compare(None) => write_compare(out, engine)?,
        DraftCommand::Uncompare(name) => {
            let name = resolve(engine, &name);
            if !engine.unstage_compare(&name)? {
                writeln!(out, "{name} is not staged")?;
            }
            write_compare(out, engine)?;
        }
        DraftCommand::Take(name) => {
            let name = resolve(engine, &name);
            let count = engine.pick_from_compare(&name).await?;
            writeln!(out, "Picked {name} (x{count})")?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Rarity(rarity) => {
            let mut selection = current_selection(engine)?;
            match rarity {
                Some(rarity) => {
                    selection.toggle_rarity(rarity);
                }
                None => selection.clear_rarities(),
            }
            engine.set_filter(selection).await?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Color(color) => {
            let mut selection = current_selection(engine)?;
            match color {
                Some(color) => {
                    selection.toggle_color(color);
                }
                None => selection.clear_colors(),
            }
            engine.set_filter(selection).await?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Limit(limit) => {
            let mut selection = current_selection(engine)?;
            selection.set_limit(limit);
            engine.set_filter(selection).await?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Search(query) => {
            let session = engine.session().context("No set loaded")?;
            table::write_cards(out, &session.search(&query), "No cards found")?;
        }
        DraftCommand::Deck => {
            let session = engine.session().context("No set loaded")?;
            writeln!(out, "Picks ({}):", session.ledger().total_owned())?;
            table::write_cards(out, &session.deck_rows(), "No picks yet")?;
        }
        DraftCommand::Show => write_pick_order(out, engine)?,
        DraftCommand::Set(set) => {
            engine.on_set_change(&set.to_uppercase()).await?;
            write_status(out, engine)?;
        }
        DraftCommand::Sets => {
            let registry = engine.registry();
            let sets = registry.available_sets();
            if sets.is_empty() {
                writeln!(out, "No {} models found", registry.mode())?;
            } else {
                writeln!(out, "{}", sets.join(" "))?;
            }
        }
        DraftCommand::New => {
            engine.new_draft().await?;
            writeln!(out, "Started a new draft")?;
            write_pick_order(out, engine)?;
        }
        DraftCommand::Help => write!(out, "{HELP}")?,
        DraftCommand::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

fn resolve(engine: &DraftEngine, name: &str) -> String {
    engine.session().map_or_else(
        || name.to_owned(),
        |s| super::resolve_card_name(s.catalogue(), name),
    )
}

fn current_selection(engine: &DraftEngine) -> anyhow::Result<FilterSelection> {
    Ok(engine
        .session()
        .context("No set loaded")?
        .selection()
        .clone())
}

fn write_filters<W>(out: &mut W, engine: &DraftEngine) -> io::Result<()>
where
    W: Write,
{
    let Some(selection) = engine.effective_selection() else {
        return Ok(());
    };
    let join = |items: Vec<String>| {
        if items.is_empty() {
            "any".to_owned()
        } else {
            items.join(",")
        }
    };
    let rarities = join(
        selection
            .rarities()
            .iter()
            .map(|r| r.as_str().to_owned())
            .collect(),
    );
    let colors = join(
        selection
            .colors()
            .iter()
            .map(|c| c.as_str().to_owned())
            .collect(),
    );
    writeln!(
        out,
        "Filters: rarity={rarities} color={colors} limit={}",
        selection.limit()
    )
}

fn write_pick_order<W>(out: &mut W, engine: &DraftEngine) -> io::Result<()>
where
    W: Write,
{
    let Some(session) = engine.session() else {
        return Ok(());
    };
    write_filters(out, engine)?;
    table::write_pick_order(out, session.pick_order())
}

fn write_compare<W>(out: &mut W, engine: &DraftEngine) -> io::Result<()>
where
    W: Write,
{
    let Some(session) = engine.session() else {
        return Ok(());
    };
    writeln!(out, "Compare:")?;
    table::write_cards(out, &session.compare_rows(), "Nothing staged")
}

fn write_status<W>(out: &mut W, engine: &DraftEngine) -> io::Result<()>
where
    W: Write,
{
    let Some(session) = engine.session() else {
        return Ok(());
    };
    writeln!(
        out,
        "Drafting {} ({} cards, {})",
        session.set_code(),
        session.catalogue().len(),
        engine.registry().mode()
    )?;
    if let Some(error) = session.load_error() {
        writeln!(out, "error: {error}")?;
    }
    if let Some(warning) = session.model_warning() {
        writeln!(out, "warning: {warning}")?;
    }
    write_pick_order(out, engine)
}
