// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Host preparation: fresh working directories and a running Docker daemon.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::logic::retry::retry;
use crate::models::HostLayout;
use crate::utils::{CommandLine, CommandRunner, run_checked};

/// Attempts for the package install; mirrors are the flaky part of a run.
pub const PACKAGE_INSTALL_ATTEMPTS: u32 = 5;

/// Remove and recreate the staging, home and data directories.
///
/// Missing directories are fine. The extensions directory under home is
/// created as well so the bundle can be dropped straight into it.
pub fn reset_directories(layout: &HostLayout) -> Result<()> {
    for dir in [&layout.staging, &layout.home, &layout.data] {
        recreate(dir)?;
    }
    let extensions = layout.extensions_dir();
    fs::create_dir_all(&extensions)
        .with_context(|| format!("Failed to create extensions directory {:?}", extensions))?;
    Ok(())
}

fn recreate(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err).with_context(|| format!("Failed to remove {:?}", dir)),
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))
}

/// Install Docker (with retries), enable it at boot and start it now.
pub fn ensure_docker(runner: &dyn CommandRunner, pause: impl FnMut(Duration)) -> Result<()> {
    let install = CommandLine::new("yum").args(["install", "-y", "docker"]);
    let out = retry(PACKAGE_INSTALL_ATTEMPTS, runner, &install, pause);
    if !out.is_success() {
        bail!(
            "`{}` failed after {} attempts: {}",
            install,
            PACKAGE_INSTALL_ATTEMPTS,
            out.stderr.trim()
        );
    }
    info!("docker package installed");

    run_checked(runner, &CommandLine::new("systemctl").args(["enable", "docker"]))?;
    run_checked(runner, &CommandLine::new("systemctl").args(["start", "docker"]))?;
    info!("docker service running");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use crate::utils::CommandOutput;

    use super::*;

    struct Scripted {
        install_failures: usize,
        start_fails: bool,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(install_failures: usize) -> Self {
            Self {
                install_failures,
                start_fails: false,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Scripted {
        fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
            let line = command.joined();
            let installs = self
                .seen
                .borrow()
                .iter()
                .filter(|l| l.starts_with("yum"))
                .count();
            self.seen.borrow_mut().push(line.clone());

            Ok(match line.as_str() {
                "yum install -y docker" if installs < self.install_failures => {
                    CommandOutput::failure(1, "Cannot retrieve repository metadata")
                }
                "systemctl start docker" if self.start_fails => {
                    CommandOutput::failure(1, "Job for docker.service failed")
                }
                _ => CommandOutput::success(),
            })
        }
    }

    fn layout(root: &Path) -> HostLayout {
        HostLayout::new(
            &root.join("staging"),
            &root.join("home"),
            &root.join("drive"),
        )
    }

    #[test]
    fn reset_directories_wipes_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        reset_directories(&layout).unwrap();
        fs::write(layout.staging.join("stale.html"), "old").unwrap();
        fs::write(layout.extension_archive(), "old jar").unwrap();
        fs::write(layout.data.join("recording.guac"), "x").unwrap();

        reset_directories(&layout).unwrap();

        assert!(layout.staging.is_dir());
        assert!(layout.extensions_dir().is_dir());
        assert_eq!(fs::read_dir(&layout.staging).unwrap().count(), 0);
        assert_eq!(fs::read_dir(&layout.data).unwrap().count(), 0);
        assert!(!layout.extension_archive().exists());
    }

    #[test]
    fn reset_directories_creates_missing_tree() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp.path().join("nested/root"));

        reset_directories(&layout).unwrap();

        assert!(layout.home.is_dir());
        assert!(layout.data.is_dir());
    }

    #[test]
    fn ensure_docker_retries_install_then_enables_and_starts() {
        let runner = Scripted::new(2);
        let mut waits = Vec::new();

        ensure_docker(&runner, |d| waits.push(d.as_secs())).unwrap();

        assert_eq!(waits, vec![0, 1, 2]);
        assert_eq!(
            *runner.seen.borrow(),
            vec![
                "yum install -y docker",
                "yum install -y docker",
                "yum install -y docker",
                "systemctl enable docker",
                "systemctl start docker",
            ]
        );
    }

    #[test]
    fn ensure_docker_fails_when_every_install_attempt_fails() {
        let runner = Scripted::new(usize::MAX);

        let err = ensure_docker(&runner, |_| {}).unwrap_err().to_string();

        assert!(err.contains("after 5 attempts"));
        assert!(!runner.seen.borrow().iter().any(|l| l.starts_with("systemctl")));
    }

    #[test]
    fn ensure_docker_fails_when_service_does_not_start() {
        let mut runner = Scripted::new(0);
        runner.start_fails = true;

        assert!(ensure_docker(&runner, |_| {}).is_err());
    }
}
