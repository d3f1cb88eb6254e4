// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Container definitions for guacd and the web application, and the
//! stop/remove/run cycle that replaces any previous instance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{HostLayout, LdapSettings, ProvisionConfig};
use crate::utils::{CommandLine, CommandRunner, run_checked};

pub const BACKEND_NAME: &str = "guacd";
pub const FRONTEND_NAME: &str = "guacamole";
pub const RESTART_POLICY: &str = "unless-stopped";
pub const DRIVE_MOUNT: &str = "/drive";
pub const HOME_MOUNT: &str = "/etc/guacamole";
pub const HTTP_PORT: u16 = 8080;

/// Everything `docker run` needs for one named container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Host path, container path.
    pub mounts: Vec<(PathBuf, String)>,
    /// Linked container name, alias.
    pub links: Vec<(String, String)>,
    /// Host port, container port.
    pub ports: Vec<(u16, u16)>,
    pub env: Vec<(String, String)>,
}

impl ContainerSpec {
    /// guacd with the shared drive mounted.
    pub fn backend(image: &str, layout: &HostLayout) -> Self {
        Self {
            name: BACKEND_NAME.to_string(),
            image: image.to_string(),
            mounts: vec![(layout.data.clone(), DRIVE_MOUNT.to_string())],
            links: Vec::new(),
            ports: Vec::new(),
            env: Vec::new(),
        }
    }

    /// The web application, linked to guacd and carrying the LDAP settings.
    pub fn frontend(config: &ProvisionConfig) -> Self {
        let layout = &config.layout;
        let mut env = vec![("GUACAMOLE_HOME".to_string(), HOME_MOUNT.to_string())];
        env.extend(ldap_environment(config.ldap.as_ref()));

        Self {
            name: FRONTEND_NAME.to_string(),
            image: config.images.frontend.clone(),
            mounts: vec![
                (layout.data.clone(), DRIVE_MOUNT.to_string()),
                (layout.home.clone(), HOME_MOUNT.to_string()),
            ],
            links: vec![(BACKEND_NAME.to_string(), BACKEND_NAME.to_string())],
            ports: vec![(HTTP_PORT, HTTP_PORT)],
            env,
        }
    }

    pub fn run_command(&self) -> CommandLine {
        let mut cmd = CommandLine::new("docker").args([
            "run",
            "-d",
            "--name",
            self.name.as_str(),
            "--restart",
            RESTART_POLICY,
        ]);
        for (name, alias) in &self.links {
            cmd = cmd.args(["--link".to_string(), format!("{name}:{alias}")]);
        }
        for (host, target) in &self.mounts {
            cmd = cmd.args(["-v".to_string(), format!("{}:{}", host.display(), target)]);
        }
        for (host, container) in &self.ports {
            cmd = cmd.args(["-p".to_string(), format!("{host}:{container}")]);
        }
        for (key, value) in &self.env {
            cmd = cmd.args(["-e".to_string(), format!("{key}={value}")]);
        }
        cmd.arg(self.image.as_str())
    }
}

/// LDAP variables for the web application image.
///
/// The full set is always emitted; without LDAP every value is empty, which
/// the image reads as "LDAP disabled".
pub fn ldap_environment(ldap: Option<&LdapSettings>) -> Vec<(String, String)> {
    let values = match ldap {
        Some(l) => [
            l.hostname.clone(),
            l.port.to_string(),
            l.user_base_dn().to_string(),
            l.config_base_dn().to_string(),
            l.group_base_dn().to_string(),
            l.username_attribute.clone(),
        ],
        None => Default::default(),
    };
    [
        "LDAP_HOSTNAME",
        "LDAP_PORT",
        "LDAP_USER_BASE_DN",
        "LDAP_CONFIG_BASE_DN",
        "LDAP_GROUP_BASE_DN",
        "LDAP_USERNAME_ATTRIBUTE",
    ]
    .into_iter()
    .map(str::to_string)
    .zip(values)
    .collect()
}

/// Pull an image; failures abort the run.
pub fn pull_image(runner: &dyn CommandRunner, image: &str) -> Result<()> {
    run_checked(runner, &CommandLine::new("docker").args(["pull", image]))
        .with_context(|| format!("Failed to pull image {image}"))?;
    info!(image, "image pulled");
    Ok(())
}

/// Stop and remove any container called `spec.name`, then start a new one.
///
/// Nothing is rolled back when the new container fails to start.
pub fn replace_container(runner: &dyn CommandRunner, spec: &ContainerSpec) -> Result<()> {
    if container_matches(runner, &spec.name, false)? {
        run_checked(runner, &CommandLine::new("docker").args(["stop", spec.name.as_str()]))?;
        info!(container = %spec.name, "stopped running container");
    }
    if container_matches(runner, &spec.name, true)? {
        run_checked(runner, &CommandLine::new("docker").args(["rm", spec.name.as_str()]))?;
        info!(container = %spec.name, "removed old container");
    }

    run_checked(runner, &spec.run_command())
        .with_context(|| format!("Failed to start container {}", spec.name))?;
    info!(container = %spec.name, image = %spec.image, "container started");
    Ok(())
}

/// True when a container with exactly this name exists (running only, unless `all`).
fn container_matches(runner: &dyn CommandRunner, name: &str, all: bool) -> Result<bool> {
    let filter = format!("name=^/{name}$");
    let cmd = CommandLine::new("docker").args([
        "ps",
        if all { "-aq" } else { "-q" },
        "--filter",
        filter.as_str(),
    ]);
    Ok(!run_checked(runner, &cmd)?.trim().is_empty())
}
