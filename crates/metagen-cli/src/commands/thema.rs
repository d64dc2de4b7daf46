//! Thema command implementation.

use crate::cli::{ThemaAction, ThemaArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use metagen_thema::{save_raw, ThemaIndex};

/// Execute a taxonomy command.
pub fn execute_thema(args: ThemaArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let source = config.thema_source()?;

    match args.action {
        ThemaAction::Fetch { output } => {
            let raw = source.load_remote()?;
            // Refuse to store data that would not load
            let index = ThemaIndex::from_raw(&raw)?;
            let path = output.unwrap_or_else(|| source.local_path().to_path_buf());
            save_raw(&raw, &path)?;

            let message = format!("Saved {} categories to {}", index.len(), path.display());
            println!("{}", formatter.success(&message));
        }
        ThemaAction::Show { code } => {
            let index = ThemaIndex::load(&source)?;
            let node = lookup(&index, &code)?;
            println!("{}", formatter.format_nodes(&[node])?);
        }
        ThemaAction::Roots => {
            let index = ThemaIndex::load(&source)?;
            println!("{}", formatter.format_nodes(&index.root_categories())?);
        }
        ThemaAction::Children { code } => {
            let index = ThemaIndex::load(&source)?;
            let node = lookup(&index, &code)?;
            println!("{}", formatter.format_nodes(&index.children_of(node))?);
        }
    }

    Ok(())
}

fn lookup<'a>(index: &'a ThemaIndex, code: &str) -> Result<&'a metagen_domain::CategoryNode> {
    index
        .by_code(code)
        .ok_or_else(|| CliError::InvalidInput(format!("Unknown category code: {}", code)))
}
