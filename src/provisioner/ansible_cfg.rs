//! INI rendering for the generated `ansible.cfg`.
use crate::config::Options;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered `[section] key = value` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnsibleCfg {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl AnsibleCfg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Apply `section -> key -> value` overrides. Existing entries keep their
    /// position; new ones are appended.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Options>) {
        for (section, entries) in overrides {
            for (key, value) in entries {
                self.set(section, key, ini_value(value));
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, (section, entries)) in self.sections.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            push_line(&mut out, &format!("[{section}]"));
            for (key, value) in entries {
                push_line(&mut out, &format!("{key} = {value}"));
            }
        }
        out
    }
}

/// Format a config value the way Ansible's INI reader expects it.
pub fn ini_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items.iter().map(ini_value).collect::<Vec<_>>().join(" "),
        Value::Object(_) => value.to_string(),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
