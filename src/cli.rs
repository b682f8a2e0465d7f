//! CLI argument parsing for the provisioner workflow.
//!
//! The CLI only gathers inputs; option layering and file generation live in
//! the config and provisioner modules.
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scenario file used when `--molecule-file` is not given.
pub const DEFAULT_MOLECULE_FILE: &str = "molecule/default/molecule.yml";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "molecule",
    version,
    about = "Provision test instances with ansible-playbook",
    after_help = "Commands:\n  converge [--playbook <file>]   Write inventory + ansible.cfg and run the playbook\n  syntax [--playbook <file>]     Run ansible-playbook --syntax-check\n  check [--playbook <file>]      Run ansible-playbook --check (dry run)\n  inventory [--format yaml|json] Print the generated inventory\n\nExamples:\n  molecule converge\n  molecule --molecule-file molecule/upgrade/molecule.yml check\n  molecule --option limit=web --option timeout=60 converge\n  molecule inventory --format json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Inputs shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Scenario file declaring platforms and provisioner options
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_MOLECULE_FILE,
        global = true
    )]
    pub molecule_file: PathBuf,

    /// Enable debug logging and pass `debug: true` to the provisioner
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override a provisioner option; VALUE is read as YAML (repeatable)
    #[arg(long = "option", value_name = "KEY=VALUE", global = true)]
    pub options: Vec<String>,

    /// ansible-playbook executable (default: $MOLECULE_ANSIBLE_PLAYBOOK, then PATH)
    #[arg(long, value_name = "PATH", global = true)]
    pub ansible_playbook: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write inventory and config, then run the playbook
    Converge(PlaybookArgs),
    /// Check playbook syntax without touching instances
    Syntax(PlaybookArgs),
    /// Dry-run the playbook (ansible-playbook --check)
    Check(PlaybookArgs),
    /// Print the inventory generated from the declared platforms
    Inventory(InventoryArgs),
}

/// Inputs for commands that run a playbook.
#[derive(Args, Debug, Clone)]
pub struct PlaybookArgs {
    /// Playbook to run (default: the `playbook` option, relative to the scenario)
    #[arg(long, value_name = "FILE")]
    pub playbook: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = InventoryFormat::Yaml)]
    pub format: InventoryFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = RootArgs::try_parse_from([
            "molecule",
            "converge",
            "--debug",
            "--option",
            "limit=web",
            "--option",
            "timeout=60",
        ])
        .expect("parse args");

        assert!(args.global.debug);
        assert_eq!(args.global.options, vec!["limit=web", "timeout=60"]);
        assert_eq!(
            args.global.molecule_file,
            PathBuf::from(DEFAULT_MOLECULE_FILE)
        );
        assert!(matches!(
            args.command,
            Command::Converge(PlaybookArgs { playbook: None })
        ));
    }

    #[test]
    fn inventory_format_defaults_to_yaml() {
        let args = RootArgs::try_parse_from(["molecule", "inventory"]).expect("parse args");

        match args.command {
            Command::Inventory(inventory) => assert_eq!(inventory.format, InventoryFormat::Yaml),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;

        RootArgs::command().debug_assert();
    }

    #[test]
    fn subcommand_is_required() {
        assert!(RootArgs::try_parse_from(["molecule"]).is_err());
    }
}
