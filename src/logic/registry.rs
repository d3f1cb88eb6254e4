// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Best-effort container registry login using parameter-store secrets.

use anyhow::Result;
use tracing::{info, warn};

use crate::models::RegistryParameters;
use crate::utils::{CommandLine, CommandRunner, run_checked};

/// Value the parameter-store CLI prints when a parameter has no value.
pub const MISSING_SENTINEL: &str = "None";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    LoggedIn,
    Skipped(String),
}

/// Log in to the registry when both credential parameters resolve.
///
/// Lookups are best-effort: a failed or empty lookup skips the login and
/// provisioning continues with anonymous pulls. Only a failing `docker login`
/// with resolved credentials is an error.
pub fn authenticate(
    runner: &dyn CommandRunner,
    params: &RegistryParameters,
) -> Result<AuthOutcome> {
    let (user_path, password_path) = match (&params.username_path, &params.password_path) {
        (Some(u), Some(p)) => (u, p),
        (None, None) => {
            return Ok(AuthOutcome::Skipped(
                "no registry credential parameters configured".into(),
            ));
        }
        _ => {
            warn!("only one registry credential parameter given, skipping registry login");
            return Ok(AuthOutcome::Skipped(
                "incomplete registry credential parameters".into(),
            ));
        }
    };

    let (Some(username), Some(password)) = (
        lookup_parameter(runner, user_path),
        lookup_parameter(runner, password_path),
    ) else {
        warn!("registry credentials not found in parameter store, skipping registry login");
        return Ok(AuthOutcome::Skipped("registry credentials missing".into()));
    };

    let login = CommandLine::new("docker")
        .args(["login", "--username", username.as_str(), "--password-stdin"])
        .stdin(password);
    run_checked(runner, &login)?;
    info!(username = %username, "logged in to container registry");
    Ok(AuthOutcome::LoggedIn)
}

/// Fetch and decrypt one parameter. `None` when it is missing or unreadable.
fn lookup_parameter(runner: &dyn CommandRunner, path: &str) -> Option<String> {
    let cmd = CommandLine::new("aws").args([
        "ssm",
        "get-parameter",
        "--name",
        path,
        "--with-decryption",
        "--query",
        "Parameter.Value",
        "--output",
        "text",
    ]);

    match runner.run(&cmd) {
        Ok(out) if out.is_success() => {
            let value = out.stdout.trim();
            if value.is_empty() || value == MISSING_SENTINEL {
                None
            } else {
                Some(value.to_string())
            }
        }
        Ok(out) => {
            warn!(parameter = path, stderr = out.stderr.trim(), "parameter lookup failed");
            None
        }
        Err(err) => {
            warn!(parameter = path, error = %format!("{:#}", err), "parameter lookup failed");
            None
        }
    }
}
