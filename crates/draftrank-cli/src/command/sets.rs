use std::io::{self, Write as _};

use anyhow::Context as _;
use draftrank_session::set_registry::SetRegistry;

use super::GlobalArg;

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct SetsArg {
    /// Also list known sets without a scoring model
    #[arg(long)]
    all: bool,
}

pub(crate) fn run(global: &GlobalArg, arg: &SetsArg) -> anyhow::Result<()> {
    let config = global.load_config()?;
    let registry = SetRegistry::from_config(&config);
    let mut out = io::stdout().lock();
    write_sets(&mut out, &registry, arg.all).context("Failed to write set list")?;
    Ok(())
}

fn write_sets<W>(out: &mut W, registry: &SetRegistry, all: bool) -> io::Result<()>
where
    W: io::Write,
{
    let available = registry.available_sets();
    if available.is_empty() && !all {
        return writeln!(
            out,
            "No {} models found under {}",
            registry.mode(),
            registry.data_dir().display()
        );
    }

    let default = registry.default_set();
    let sets = if all {
        registry.known_sets().collect::<Vec<_>>()
    } else {
        available.clone()
    };
    for set in sets {
        let has_model = available.contains(&set);
        let marker = if Some(set) == default { "*" } else { " " };
        let status = if has_model { "" } else { "  (no model)" };
        writeln!(out, "{marker} {set}{status}")?;
    }
    Ok(())
}
