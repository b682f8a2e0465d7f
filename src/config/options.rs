//! Provisioner option defaults and layering.
//!
//! Options are resolved from three explicit layers: built-in defaults, the
//! `provisioner.options` mapping from molecule.yml, and CLI arguments. Later
//! layers replace same-named keys wholesale; keys no layer below knows about
//! pass straight through.
use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};

/// Flat option mapping handed to the provisioner.
pub type Options = Map<String, Value>;

pub const DEFAULT_CONFIG_FILE: &str = "ansible.cfg";
pub const DEFAULT_INVENTORY_FILE: &str = "ansible_inventory.yml";
pub const DEFAULT_PLAYBOOK: &str = "playbook.yml";
pub const DEFAULT_TIMEOUT: u64 = 30;

pub const DEFAULT_RAW_SSH_ARGS: [&str; 4] = [
    "-o UserKnownHostsFile=/dev/null",
    "-o IdentitiesOnly=yes",
    "-o ControlMaster=auto",
    "-o ControlPersist=60s",
];

/// Built-in provisioner options.
pub fn default_options() -> Options {
    let raw_ssh_args = DEFAULT_RAW_SSH_ARGS
        .iter()
        .map(|arg| Value::from(*arg))
        .collect::<Vec<_>>();

    let mut options = Options::new();
    options.insert("ask_become_pass".into(), Value::Bool(false));
    options.insert("ask_vault_pass".into(), Value::Bool(false));
    options.insert("config_file".into(), DEFAULT_CONFIG_FILE.into());
    options.insert("diff".into(), Value::Bool(true));
    options.insert("host_key_checking".into(), Value::Bool(false));
    options.insert("inventory_file".into(), DEFAULT_INVENTORY_FILE.into());
    options.insert("limit".into(), "all".into());
    options.insert("playbook".into(), DEFAULT_PLAYBOOK.into());
    options.insert("raw_ssh_args".into(), Value::Array(raw_ssh_args));
    options.insert("become".into(), Value::Bool(true));
    options.insert("become_user".into(), Value::Bool(false));
    options.insert("tags".into(), Value::Bool(false));
    options.insert("timeout".into(), DEFAULT_TIMEOUT.into());
    options.insert("vault_password_file".into(), Value::Bool(false));
    options.insert("verbose".into(), Value::Bool(false));
    options
}

/// The three option layers, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionLayers {
    pub defaults: Options,
    pub config: Options,
    pub args: Options,
}

impl OptionLayers {
    /// Compose `defaults <- config <- args`.
    pub fn merged(&self) -> Options {
        let mut merged = self.defaults.clone();
        for layer in [&self.config, &self.args] {
            for (key, value) in layer {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

/// Read a string option, ignoring values of any other type.
pub fn string_option<'a>(options: &'a Options, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Read a boolean option; anything but `true` is false.
pub fn bool_option(options: &Options, key: &str) -> bool {
    matches!(options.get(key), Some(Value::Bool(true)))
}

/// Parse a `KEY=VALUE` CLI override. The value is read as a YAML scalar so
/// `timeout=60` yields a number and `diff=false` a boolean.
pub fn parse_option_arg(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("option override must be KEY=VALUE (got {raw:?})"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("option override has an empty key (got {raw:?})"));
    }
    let value = value.trim();
    if value.is_empty() {
        return Ok((key.to_string(), Value::String(String::new())));
    }
    let parsed: Value = serde_yaml::from_str(value)
        .with_context(|| format!("parse value for option override {key}"))?;
    Ok((key.to_string(), parsed))
}

/// Deep-merge `overlay` into `base`. Mappings merge key by key; any other
/// value replaces what was there. A null overlay leaves `base` untouched.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
