// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! The provisioning run: each step in order, aborting on the first failure.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::logic::bundle::{package_bundle, write_bundle};
use crate::logic::containers::{ContainerSpec, pull_image, replace_container};
use crate::logic::host::{ensure_docker, reset_directories};
use crate::logic::registry::{AuthOutcome, authenticate};
use crate::models::ProvisionConfig;
use crate::utils::{CommandRunner, hash_file};

/// Drives one run against a command runner.
pub struct Provisioner<'a> {
    config: &'a ProvisionConfig,
    runner: &'a dyn CommandRunner,
    pause: fn(Duration),
}

impl<'a> Provisioner<'a> {
    /// `pause` is used between package-install retries.
    pub fn new(
        config: &'a ProvisionConfig,
        runner: &'a dyn CommandRunner,
        pause: fn(Duration),
    ) -> Self {
        Self {
            config,
            runner,
            pause,
        }
    }

    /// Execute every step. Completed steps are not undone when a later one fails.
    pub fn run(&self) -> Result<()> {
        let config = self.config;
        self.warn_about_ignored_settings();

        reset_directories(&config.layout)?;
        info!(
            staging = ?config.layout.staging,
            home = ?config.layout.home,
            data = ?config.layout.data,
            "host directories recreated"
        );

        ensure_docker(self.runner, self.pause)?;

        match authenticate(self.runner, &config.registry)? {
            AuthOutcome::LoggedIn => {}
            AuthOutcome::Skipped(reason) => info!(%reason, "registry login skipped"),
        }

        pull_image(self.runner, &config.images.backend)?;
        pull_image(self.runner, &config.images.frontend)?;

        self.build_branding()?;

        replace_container(
            self.runner,
            &ContainerSpec::backend(&config.images.backend, &config.layout),
        )?;
        replace_container(self.runner, &ContainerSpec::frontend(config))?;

        info!(
            ldap = config.ldap.is_some(),
            "guacamole provisioned, listening on port 8080"
        );
        Ok(())
    }

    fn build_branding(&self) -> Result<()> {
        let layout = &self.config.layout;
        let files = write_bundle(&layout.staging, &self.config.branding)
            .context("Failed to generate branding bundle")?;
        let archive = layout.extension_archive();
        package_bundle(&layout.staging, &archive)
            .context("Failed to package branding bundle")?;
        let sha256 = hash_file(&archive)?;
        info!(
            archive = ?archive,
            files = files.len(),
            %sha256,
            brand = %self.config.branding.brand,
            "branding extension written"
        );
        Ok(())
    }

    fn warn_about_ignored_settings(&self) {
        if let Some(roles) = &self.config.ignored_roles_dn {
            warn!(roles_dn = %roles, "roles base DN given without LDAP hostname/domain, ignoring");
        }
        for link in &self.config.branding.links {
            if !link.is_absolute_url() {
                warn!(url = %link.url, "link URL is not absolute, writing it as given");
            }
        }
    }
}
