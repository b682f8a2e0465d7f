//! Shared scenario setup for integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const GROUPED_MOLECULE_YML: &str = "\
platforms:
  - name: instance-1
    groups:
      - foo
      - bar
  - name: instance-2
provisioner:
  name: ansible
  options:
    foo: bar
";

/// Prints the environment it sees and every argument, one per line.
const ECHO_PLAYBOOK: &str = "#!/bin/sh
echo \"ANSIBLE_CONFIG=$ANSIBLE_CONFIG\"
echo \"ANSIBLE_HOST_KEY_CHECKING=$ANSIBLE_HOST_KEY_CHECKING\"
for arg in \"$@\"; do
  echo \"$arg\"
done
";

const FAILING_PLAYBOOK: &str = "#!/bin/sh
echo 'ERROR! the playbook could not be found' >&2
exit 4
";

/// A temporary scenario directory with a molecule.yml and a stub
/// `ansible-playbook` next to it.
pub struct Scenario {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub molecule_file: PathBuf,
    pub ansible_playbook: PathBuf,
}

impl Scenario {
    pub fn new(molecule_yml: &str) -> Self {
        Self::with_stub(molecule_yml, ECHO_PLAYBOOK)
    }

    pub fn failing(molecule_yml: &str) -> Self {
        Self::with_stub(molecule_yml, FAILING_PLAYBOOK)
    }

    fn with_stub(molecule_yml: &str, stub: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        let scenario_dir = root.join("molecule/default");
        fs::create_dir_all(&scenario_dir).expect("create scenario dir");

        let molecule_file = scenario_dir.join("molecule.yml");
        fs::write(&molecule_file, molecule_yml).expect("write molecule.yml");
        fs::write(scenario_dir.join("playbook.yml"), "- hosts: all\n").expect("write playbook");

        let ansible_playbook = root.join("ansible-playbook");
        write_executable(&ansible_playbook, stub);

        Self {
            _temp_dir: temp_dir,
            root,
            molecule_file,
            ansible_playbook,
        }
    }

    pub fn ephemeral_dir(&self) -> PathBuf {
        self.root.join("molecule/default/.molecule")
    }

    /// Run the binary against this scenario with `args` after the globals.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_molecule"))
            .arg("--molecule-file")
            .arg(&self.molecule_file)
            .arg("--ansible-playbook")
            .arg(&self.ansible_playbook)
            .args(args)
            .current_dir(&self.root)
            .env_remove("RUST_LOG")
            .env_remove("MOLECULE_ANSIBLE_PLAYBOOK")
            .output()
            .expect("run molecule")
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).expect("write stub");
    let mut permissions = fs::metadata(path).expect("stub metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("chmod stub");
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
