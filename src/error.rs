//! Error types surfaced by the provisioner.
//!
//! Workflow code stays on `anyhow`; these are the failures callers may want to
//! match on.
use std::path::PathBuf;
use thiserror::Error;

/// No platforms were declared, so there is nothing to provision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Instances missing from the 'platform' section of molecule.yml.")]
pub struct InventoryEmptyError;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("unsupported provisioner '{0}'")]
    UnsupportedProvisioner(String),

    #[error("ansible-playbook not found (set MOLECULE_ANSIBLE_PLAYBOOK or install ansible)")]
    PlaybookNotFound,

    #[error("ansible-playbook {playbook} failed with status {status}: {stderr}")]
    PlaybookFailed {
        playbook: PathBuf,
        status: String,
        stderr: String,
    },
}
