//! Ansible provisioner: generated inventory and config plus playbook runs.
use super::ansible_cfg::{ini_value, AnsibleCfg};
use crate::ansible_playbook::{AnsiblePlaybook, PlaybookRunner};
use crate::config::{
    bool_option, string_option, Config, Options, DEFAULT_CONFIG_FILE, DEFAULT_INVENTORY_FILE,
    DEFAULT_PLAYBOOK, DEFAULT_TIMEOUT,
};
use crate::error::InventoryEmptyError;
use crate::inventory::{build_inventory, verify_inventory, Inventory};
use crate::util::write_text;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ANSIBLE_MANAGED: &str = "Ansible managed: Do NOT edit this file manually!";

pub struct Ansible {
    config: Config,
    runner: Box<dyn PlaybookRunner>,
}

impl Ansible {
    pub fn new(config: Config, runner: Box<dyn PlaybookRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.config.provisioner.name
    }

    /// Ansible-specific defaults layered over the built-in ones. There are
    /// none today.
    pub fn default_options(&self) -> Options {
        Options::new()
    }

    /// Fully merged options for this run.
    pub fn options(&self) -> Options {
        let mut layers = self.config.option_layers();
        layers.defaults.extend(self.default_options());
        layers.merged()
    }

    /// Inventory for the current platforms, rebuilt on every call.
    pub fn inventory(&self) -> Inventory {
        build_inventory(self.config.platforms(), self.config.scenario_name())
    }

    pub fn inventory_file(&self) -> PathBuf {
        self.ephemeral_file("inventory_file", DEFAULT_INVENTORY_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.ephemeral_file("config_file", DEFAULT_CONFIG_FILE)
    }

    /// The `playbook` option resolved against the scenario directory.
    pub fn default_playbook(&self) -> PathBuf {
        let options = self.options();
        let playbook = string_option(&options, "playbook").unwrap_or(DEFAULT_PLAYBOOK);
        self.config.scenario_directory().join(playbook)
    }

    fn ephemeral_file(&self, key: &str, fallback: &str) -> PathBuf {
        let options = self.options();
        let name = string_option(&options, key).unwrap_or(fallback);
        self.config.ephemeral_directory().join(name)
    }

    pub fn verify_inventory(&self) -> Result<(), InventoryEmptyError> {
        verify_inventory(self.config.platforms())
    }

    pub fn write_inventory(&self) -> Result<()> {
        self.verify_inventory()?;
        let inventory = self.inventory();
        let path = self.inventory_file();
        let text = inventory.to_yaml().context("serialize inventory")?;
        write_text(&path, &text)?;
        tracing::debug!(
            path = %path.display(),
            groups = inventory.group_names().count(),
            hosts = inventory.host_entry_count(),
            "wrote inventory"
        );
        Ok(())
    }

    /// Contents of the generated ansible.cfg, including `config_options`.
    pub fn ansible_cfg(&self) -> AnsibleCfg {
        self.ansible_cfg_with(filter_plugin_directory().as_deref())
    }

    /// `filter_plugins` is only written when a plugin directory is given.
    fn ansible_cfg_with(&self, filter_plugins: Option<&Path>) -> AnsibleCfg {
        let options = self.options();
        let host_key_checking = if bool_option(&options, "host_key_checking") {
            "True"
        } else {
            "False"
        };
        let timeout = options
            .get("timeout")
            .map(ini_value)
            .unwrap_or_else(|| DEFAULT_TIMEOUT.to_string());
        let ssh_args = options
            .get("raw_ssh_args")
            .map(ini_value)
            .unwrap_or_default();
        let roles_path = self.config.scenario_directory().join("..").join("..");

        let mut cfg = AnsibleCfg::new();
        cfg.set("defaults", "ansible_managed", ANSIBLE_MANAGED);
        if let Some(dir) = filter_plugins {
            cfg.set("defaults", "filter_plugins", dir.display().to_string());
        }
        cfg.set("defaults", "host_key_checking", host_key_checking);
        cfg.set("defaults", "retry_files_enabled", "False");
        cfg.set("defaults", "roles_path", roles_path.display().to_string());
        cfg.set("defaults", "timeout", timeout);
        cfg.set("ssh_connection", "scp_if_ssh", "True");
        cfg.set("ssh_connection", "ssh_args", ssh_args);
        cfg.apply_overrides(&self.config.config.provisioner.config_options);
        cfg
    }

    pub fn write_config(&self) -> Result<()> {
        let path = self.config_file();
        write_text(&path, &self.ansible_cfg().render())?;
        tracing::debug!(path = %path.display(), "wrote ansible config");
        Ok(())
    }

    /// Create the ephemeral directory and write inventory and config into it.
    pub fn setup(&self) -> Result<()> {
        let dir = self.config.ephemeral_directory();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        self.write_inventory()?;
        self.write_config()
    }

    pub fn converge(&self, playbook: &Path) -> Result<String> {
        self.ansible_playbook(playbook).execute(self.runner.as_ref())
    }

    pub fn syntax(&self, playbook: &Path) -> Result<String> {
        let mut ansible_playbook = self.ansible_playbook(playbook);
        ansible_playbook.add_cli_arg("syntax-check", true);
        ansible_playbook.execute(self.runner.as_ref())
    }

    /// Dry run.
    pub fn check(&self, playbook: &Path) -> Result<String> {
        let mut ansible_playbook = self.ansible_playbook(playbook);
        ansible_playbook.add_cli_arg("check", true);
        ansible_playbook.execute(self.runner.as_ref())
    }

    fn ansible_playbook(&self, playbook: &Path) -> AnsiblePlaybook {
        AnsiblePlaybook::new(
            &self.inventory_file(),
            playbook,
            &self.config_file(),
            self.options(),
        )
    }
}

/// Plugins installed next to the executable, under
/// `provisioner/ansible/plugins`.
pub fn plugin_directory() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("provisioner").join("ansible").join("plugins"))
}

/// The filter plugin directory, if one is installed.
pub fn filter_plugin_directory() -> Option<PathBuf> {
    plugin_directory()
        .map(|dir| dir.join("filters"))
        .filter(|dir| dir.is_dir())
}

#[cfg(test)]
#[path = "ansible_tests.rs"]
mod tests;
