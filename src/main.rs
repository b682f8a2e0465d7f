use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod ansible_playbook;
mod cli;
mod config;
mod error;
mod inventory;
mod provisioner;
mod util;
mod workflow;

use cli::{Command, RootArgs};
use workflow::PlaybookAction;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.global.debug);

    match args.command {
        Command::Converge(playbook) => {
            workflow::run_playbook(&args.global, PlaybookAction::Converge, playbook)
        }
        Command::Syntax(playbook) => {
            workflow::run_playbook(&args.global, PlaybookAction::Syntax, playbook)
        }
        Command::Check(playbook) => {
            workflow::run_playbook(&args.global, PlaybookAction::Check, playbook)
        }
        Command::Inventory(inventory) => workflow::run_inventory(&args.global, inventory),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--debug` selects debug level.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
