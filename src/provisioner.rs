//! Provisioner selection.
use crate::ansible_playbook::PlaybookRunner;
use crate::config::Config;
use crate::error::ProvisionError;

mod ansible;
mod ansible_cfg;

pub use ansible::Ansible;

pub const ANSIBLE: &str = "ansible";

/// Build the provisioner named by `provisioner.name`.
pub fn from_config(
    config: Config,
    runner: Box<dyn PlaybookRunner>,
) -> Result<Ansible, ProvisionError> {
    match config.config.provisioner.name.as_str() {
        ANSIBLE => Ok(Ansible::new(config, runner)),
        other => Err(ProvisionError::UnsupportedProvisioner(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansible_playbook::ProcessRunner;
    use crate::config::Options;
    use serde_json::json;

    #[test]
    fn selects_ansible_by_name() {
        let config = Config::new("molecule.yml", Options::new(), vec![json!({})])
            .expect("build config");

        let provisioner =
            from_config(config, Box::new(ProcessRunner::default())).expect("ansible provisioner");

        assert_eq!(provisioner.name(), "ansible");
    }

    #[test]
    fn rejects_unknown_provisioners() {
        let config = Config::new(
            "molecule.yml",
            Options::new(),
            vec![json!({ "provisioner": { "name": "chef" } })],
        )
        .expect("build config");

        let err = from_config(config, Box::new(ProcessRunner::default()))
            .err()
            .expect("chef is not supported");

        assert_eq!(err.to_string(), "unsupported provisioner 'chef'");
    }
}
