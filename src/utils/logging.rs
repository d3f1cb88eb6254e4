// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Tracing setup routing every event to the console and to an audit log.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Notice appended to every fatal error report.
pub const FAILURE_NOTICE: &str = "install failed";

/// Install the global subscriber with a stdout layer and an audit-file layer.
///
/// The audit file is opened in append mode. When it cannot be opened the
/// console layer is still installed and a warning names the path.
pub fn init(audit_log: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(UtcTime::new(Rfc3339))
        .with_writer(std::io::stdout);

    let audit_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(audit_log);
    let (audit, open_error) = match audit_file {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_timer(UtcTime::new(Rfc3339))
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(audit)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(err) = open_error {
        warn!(path = ?audit_log, %err, "audit log unavailable, logging to console only");
    }
    Ok(())
}

/// Report a fatal error to both sinks, followed by the generic failure notice.
pub fn report_failure(err: &anyhow::Error) {
    error!("{:#}", err);
    error!("{}", FAILURE_NOTICE);
}
