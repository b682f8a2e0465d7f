//! Command handlers: load the scenario, prepare files, run the playbook.
use crate::ansible_playbook::ProcessRunner;
use crate::cli::{GlobalArgs, InventoryArgs, InventoryFormat, PlaybookArgs};
use crate::config::{parse_option_arg, Config, Options};
use crate::provisioner::{self, Ansible};
use crate::util::display_path;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Playbook operations exposed on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybookAction {
    Converge,
    Syntax,
    Check,
}

impl PlaybookAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybookAction::Converge => "converge",
            PlaybookAction::Syntax => "syntax",
            PlaybookAction::Check => "check",
        }
    }
}

pub fn run_playbook(
    global: &GlobalArgs,
    action: PlaybookAction,
    args: PlaybookArgs,
) -> Result<()> {
    let provisioner = load_provisioner(global)?;
    provisioner.setup()?;

    let cwd = std::env::current_dir().ok();
    eprintln!("{}", status_line(action, &provisioner, cwd.as_deref()));

    let playbook = args.playbook.unwrap_or_else(|| provisioner.default_playbook());
    let stdout = match action {
        PlaybookAction::Converge => provisioner.converge(&playbook),
        PlaybookAction::Syntax => provisioner.syntax(&playbook),
        PlaybookAction::Check => provisioner.check(&playbook),
    }
    .with_context(|| format!("{} {}", action.as_str(), playbook.display()))?;

    print!("{stdout}");
    Ok(())
}

/// One-line summary of what is about to run, e.g.
/// `converge default (ansible): inventory ..., config ...`.
fn status_line(action: PlaybookAction, provisioner: &Ansible, cwd: Option<&Path>) -> String {
    format!(
        "{} {} ({}): inventory {}, config {}",
        action.as_str(),
        provisioner.config().scenario_name(),
        provisioner.name(),
        display_path(&provisioner.inventory_file(), cwd),
        display_path(&provisioner.config_file(), cwd)
    )
}

pub fn run_inventory(global: &GlobalArgs, args: InventoryArgs) -> Result<()> {
    let provisioner = load_provisioner(global)?;
    provisioner.verify_inventory()?;
    let inventory = provisioner.inventory();

    let text = match args.format {
        InventoryFormat::Yaml => inventory.to_yaml().context("serialize inventory YAML")?,
        InventoryFormat::Json => {
            let mut text =
                serde_json::to_string_pretty(&inventory).context("serialize inventory JSON")?;
            text.push('\n');
            text
        }
    };
    print!("{text}");
    Ok(())
}

fn load_provisioner(global: &GlobalArgs) -> Result<Ansible> {
    let args = cli_options(global)?;
    let config = Config::new(global.molecule_file.clone(), args, Vec::new())?;
    tracing::debug!(
        molecule_file = %config.molecule_file().display(),
        scenario = config.scenario_name(),
        platforms = config.platforms().len(),
        cli_options = config.args().len(),
        "loaded config"
    );
    let runner = ProcessRunner::new(global.ansible_playbook.clone());
    Ok(provisioner::from_config(config, Box::new(runner))?)
}

/// CLI layer of the provisioner options.
fn cli_options(global: &GlobalArgs) -> Result<Options> {
    let mut options = Options::new();
    if global.debug {
        options.insert("debug".to_string(), Value::Bool(true));
    }
    for raw in &global.options {
        let (key, value) = parse_option_arg(raw)?;
        options.insert(key, value);
    }
    Ok(options)
}
