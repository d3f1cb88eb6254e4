//! Binary-level checks of exit codes and the no-side-effects guarantee on
//! rejected configurations.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

struct Sandbox {
    _tmp: TempDir,
    staging: PathBuf,
    home: PathBuf,
    data: PathBuf,
    audit: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        Self {
            staging: root.join("staging"),
            home: root.join("home"),
            data: root.join("drive"),
            audit: root.join("audit.log"),
            _tmp: tmp,
        }
    }

    /// The binary with host paths redirected into the sandbox and no
    /// inherited GUAC_* settings.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("guacamole-setup").unwrap();
        for (key, _) in std::env::vars() {
            if key.starts_with("GUAC_") {
                cmd.env_remove(key);
            }
        }
        cmd.env("GUAC_SETUP_STAGING_DIR", &self.staging)
            .env("GUAC_SETUP_HOME_DIR", &self.home)
            .env("GUAC_SETUP_DATA_DIR", &self.data)
            .env("GUAC_SETUP_AUDIT_LOG", &self.audit);
        cmd
    }

    fn assert_untouched(&self) {
        for dir in [&self.staging, &self.home, &self.data] {
            assert!(!dir.exists(), "{} must not be created", dir.display());
        }
    }
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn audit_contents(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

#[test]
fn ldap_hostname_alone_exits_1_without_side_effects() {
    let sandbox = Sandbox::new();

    let output = sandbox.cmd().args(["-H", "ldap.example.com"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    sandbox.assert_untouched();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("must be given together"));
    assert!(stdout.contains("install failed"));
}

#[test]
fn ldap_domain_alone_exits_1_without_side_effects() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["-D", "DC=example,DC=com"])
        .assert()
        .code(1);

    sandbox.assert_untouched();
}

#[test]
fn half_link_pairs_exit_1() {
    for args in [
        ["-L", "https://a.example"],
        ["-l", "Primary"],
        ["-S", "https://b.example"],
        ["-s", "Secondary"],
    ] {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(args).assert().code(1);
        sandbox.assert_untouched();
    }
}

// The failure is written to the audit sink as well as to the console.
#[test]
fn validation_failure_reaches_audit_log() {
    let sandbox = Sandbox::new();

    sandbox.cmd().args(["-l", "Help"]).assert().code(1);

    let audit = audit_contents(&sandbox.audit);
    assert!(audit.contains("-L/--primary-link-url"));
    assert!(audit.contains("install failed"));
}

#[test]
fn help_exits_0() {
    let sandbox = Sandbox::new();

    let output = sandbox.cmd().arg("-h").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Usage"));
    sandbox.assert_untouched();
}

#[test]
fn unknown_flag_prints_usage_and_exits_1() {
    let sandbox = Sandbox::new();

    let output = sandbox.cmd().arg("-Z").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
    assert!(stderr.contains("-Z"));
    sandbox.assert_untouched();
}
