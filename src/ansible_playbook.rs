//! `ansible-playbook` command construction and execution.
//!
//! [`AnsiblePlaybook`] turns merged provisioner options into an argv and an
//! environment. Spawning is behind [`PlaybookRunner`] so callers can swap the
//! process out.
use crate::config::{bool_option, Options};
use crate::error::ProvisionError;
use crate::util::output_excerpt;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

pub const ANSIBLE_PLAYBOOK_BIN: &str = "ansible-playbook";
pub const ANSIBLE_PLAYBOOK_ENV: &str = "MOLECULE_ANSIBLE_PLAYBOOK";

const MAX_STDERR_BYTES: usize = 4096;

/// Options the adapter consumes itself rather than forwarding as flags.
const CONSUMED_OPTIONS: &[&str] = &[
    "config_file",
    "debug",
    "host_key_checking",
    "inventory_file",
    "playbook",
    "raw_ssh_args",
];

/// A fully rendered playbook run, independent of how it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookInvocation {
    pub playbook: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl PlaybookInvocation {
    /// Shell-quoted command line, for logs and error messages.
    pub fn command_line(&self, program: &str) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(program);
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// Executes a rendered invocation and returns its stdout.
pub trait PlaybookRunner {
    fn run(&self, invocation: &PlaybookInvocation) -> Result<String>;
}

/// Builder for one `ansible-playbook` run.
#[derive(Debug, Clone)]
pub struct AnsiblePlaybook {
    inventory_file: PathBuf,
    playbook: PathBuf,
    config_file: PathBuf,
    options: Options,
    cli_args: Vec<(String, Value)>,
}

impl AnsiblePlaybook {
    pub fn new(
        inventory_file: &Path,
        playbook: &Path,
        config_file: &Path,
        options: Options,
    ) -> Self {
        Self {
            inventory_file: inventory_file.to_path_buf(),
            playbook: playbook.to_path_buf(),
            config_file: config_file.to_path_buf(),
            options,
            cli_args: Vec::new(),
        }
    }

    /// Append an extra flag after the option flags, e.g. `("check", true)`.
    pub fn add_cli_arg(&mut self, name: &str, value: impl Into<Value>) {
        self.cli_args.push((name.to_string(), value.into()));
    }

    pub fn invocation(&self) -> PlaybookInvocation {
        let mut args = vec![
            self.playbook.display().to_string(),
            format!("--inventory={}", self.inventory_file.display()),
        ];

        let mut keys: Vec<&String> = self.options.keys().collect();
        keys.sort();
        for key in keys {
            if CONSUMED_OPTIONS.contains(&key.as_str()) {
                continue;
            }
            push_flag(&mut args, key, &self.options[key.as_str()]);
        }
        for (name, value) in &self.cli_args {
            push_flag(&mut args, name, value);
        }

        let env = vec![
            (
                "ANSIBLE_CONFIG".to_string(),
                self.config_file.display().to_string(),
            ),
            (
                "ANSIBLE_HOST_KEY_CHECKING".to_string(),
                bool_option(&self.options, "host_key_checking").to_string(),
            ),
        ];

        PlaybookInvocation {
            playbook: self.playbook.clone(),
            args,
            env,
        }
    }

    pub fn execute(&self, runner: &dyn PlaybookRunner) -> Result<String> {
        runner.run(&self.invocation())
    }
}

/// Render one option as zero or more `--flag[=value]` words.
fn push_flag(args: &mut Vec<String>, key: &str, value: &Value) {
    let flag = format!("--{}", key.replace('_', "-"));
    match value {
        Value::Bool(true) => args.push(flag),
        Value::Bool(false) | Value::Null => {}
        Value::String(text) => args.push(format!("{flag}={text}")),
        Value::Number(number) => args.push(format!("{flag}={number}")),
        Value::Array(items) => {
            for item in items {
                push_flag(args, key, item);
            }
        }
        Value::Object(_) => args.push(format!("{flag}={value}")),
    }
}

/// Runs `ansible-playbook` as a child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    executable: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    /// Resolve the executable: explicit path > env var > `PATH` lookup.
    pub fn resolve_executable(&self) -> Result<PathBuf, ProvisionError> {
        if let Some(path) = &self.executable {
            return Ok(path.clone());
        }
        if let Some(path) = std::env::var_os(ANSIBLE_PLAYBOOK_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        which::which(ANSIBLE_PLAYBOOK_BIN).map_err(|_| ProvisionError::PlaybookNotFound)
    }
}

impl PlaybookRunner for ProcessRunner {
    fn run(&self, invocation: &PlaybookInvocation) -> Result<String> {
        let executable = self.resolve_executable()?;
        let command_line = invocation.command_line(&executable.display().to_string());
        tracing::debug!(command = %command_line, "spawn ansible-playbook");

        let start = Instant::now();
        let output = Command::new(&executable)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("spawn {}", executable.display()))?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            playbook = %invocation.playbook.display(),
            stdout_bytes = output.stdout.len(),
            status = %output.status,
            "ansible-playbook complete"
        );

        if !output.status.success() {
            return Err(ProvisionError::PlaybookFailed {
                playbook: invocation.playbook.clone(),
                status: output.status.to_string(),
                stderr: output_excerpt(&output.stderr, MAX_STDERR_BYTES),
            }
            .into());
        }

        String::from_utf8(output.stdout).context("decode ansible-playbook stdout as UTF-8")
    }
}

#[cfg(test)]
#[path = "ansible_playbook_tests.rs"]
mod tests;
