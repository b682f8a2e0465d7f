//! Scenario configuration loaded from `molecule.yml`.
//!
//! Raw layers are merged as dynamic values first, then read into a typed view.
//! Keeping the merge untyped lets sparse layers (a file that only sets
//! `platforms`, say) fall back to the built-in section defaults.
use crate::inventory::Platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

mod options;

pub use options::{
    bool_option, default_options, deep_merge, parse_option_arg, string_option, OptionLayers,
    Options, DEFAULT_CONFIG_FILE, DEFAULT_INVENTORY_FILE, DEFAULT_PLAYBOOK, DEFAULT_TIMEOUT,
};

pub const DEFAULT_SCENARIO_NAME: &str = "default";
pub const EPHEMERAL_DIR_NAME: &str = ".molecule";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DriverSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvisionerSection {
    pub name: String,
    #[serde(default)]
    pub options: Options,
    /// `section -> key -> value` overrides for the generated ansible.cfg.
    #[serde(default)]
    pub config_options: BTreeMap<String, Options>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScenarioSection {
    pub name: String,
}

/// Typed view of the merged configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MoleculeConfig {
    pub driver: DriverSection,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    pub provisioner: ProvisionerSection,
    pub scenario: ScenarioSection,
}

/// Section defaults every config layer is merged over.
pub fn base_config() -> Value {
    json!({
        "driver": { "name": "docker" },
        "platforms": [],
        "provisioner": {
            "name": "ansible",
            "options": {},
            "config_options": {}
        },
        "scenario": { "name": DEFAULT_SCENARIO_NAME }
    })
}

/// A loaded scenario: where it lives, what it declares, and the CLI overrides
/// that apply to this run.
#[derive(Debug, Clone)]
pub struct Config {
    molecule_file: PathBuf,
    args: Options,
    pub config: MoleculeConfig,
}

impl Config {
    /// Build a config from explicit layers, or from `molecule_file` when
    /// `configs` is empty.
    pub fn new(
        molecule_file: impl Into<PathBuf>,
        args: Options,
        configs: Vec<Value>,
    ) -> Result<Self> {
        let molecule_file = molecule_file.into();
        let layers = if configs.is_empty() {
            vec![load_molecule_file(&molecule_file)?]
        } else {
            configs
        };

        let mut merged = base_config();
        for layer in layers {
            deep_merge(&mut merged, layer);
        }
        let config: MoleculeConfig = serde_json::from_value(merged)
            .with_context(|| format!("invalid config in {}", molecule_file.display()))?;

        Ok(Self {
            molecule_file,
            args,
            config,
        })
    }

    pub fn molecule_file(&self) -> &Path {
        &self.molecule_file
    }

    /// Directory holding molecule.yml and the scenario playbooks.
    pub fn scenario_directory(&self) -> PathBuf {
        match self.molecule_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Directory for generated files; safe to delete between runs.
    pub fn ephemeral_directory(&self) -> PathBuf {
        self.scenario_directory().join(EPHEMERAL_DIR_NAME)
    }

    pub fn scenario_name(&self) -> &str {
        &self.config.scenario.name
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.config.platforms
    }

    pub fn args(&self) -> &Options {
        &self.args
    }

    /// Option layers with the built-in defaults at the bottom.
    pub fn option_layers(&self) -> OptionLayers {
        OptionLayers {
            defaults: default_options(),
            config: self.config.provisioner.options.clone(),
            args: self.args.clone(),
        }
    }
}

fn load_molecule_file(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value: Value =
        serde_yaml::from_str(&text).with_context(|| format!("parse YAML {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
