//! Ansible inventory projection of the declared platforms.
//!
//! The inventory is never stored: it is rebuilt from the platform list each
//! time it is needed, so it always reflects the current config.
use crate::error::InventoryEmptyError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Group that receives every platform declaring no groups of its own.
pub const UNGROUPED: &str = "ungrouped";

/// Transport hint written for every host.
pub const DEFAULT_CONNECTION: &str = "docker";

/// A declared test instance from the `platforms` section.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Platform {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

impl Platform {
    /// Declared groups; absent and empty are the same thing.
    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or(&[])
    }

    /// Host key for this platform within `scenario_name`.
    pub fn instance_key(&self, scenario_name: &str) -> String {
        format!("{}-{}", self.name, scenario_name)
    }
}

/// Per-host variables.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HostVars {
    pub ansible_connection: String,
}

impl Default for HostVars {
    fn default() -> Self {
        Self {
            ansible_connection: DEFAULT_CONNECTION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Group {
    #[serde(default)]
    pub hosts: IndexMap<String, HostVars>,
}

/// Group name -> hosts, in first-seen order.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Inventory {
    groups: IndexMap<String, Group>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the named group, inserting an empty one if it is missing.
    pub fn group_mut(&mut self, name: &str) -> &mut Group {
        self.groups.entry(name.to_string()).or_default()
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Host entries across all groups; a host in two groups counts twice.
    pub fn host_entry_count(&self) -> usize {
        self.groups.values().map(|group| group.hosts.len()).sum()
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Project platforms into an inventory keyed by `"{name}-{scenario_name}"`.
pub fn build_inventory(platforms: &[Platform], scenario_name: &str) -> Inventory {
    let mut inventory = Inventory::new();
    for platform in platforms {
        let key = platform.instance_key(scenario_name);
        let groups = platform.groups();
        if groups.is_empty() {
            inventory
                .group_mut(UNGROUPED)
                .hosts
                .insert(key, HostVars::default());
            continue;
        }
        for group in groups {
            inventory
                .group_mut(group)
                .hosts
                .insert(key.clone(), HostVars::default());
        }
    }
    inventory
}

/// Refuse to provision when no platforms are declared.
pub fn verify_inventory(platforms: &[Platform]) -> Result<(), InventoryEmptyError> {
    if platforms.is_empty() {
        return Err(InventoryEmptyError);
    }
    Ok(())
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
