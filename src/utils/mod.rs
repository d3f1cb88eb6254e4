// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Host-facing helpers shared by the provisioning steps.

pub mod command;
pub mod hash;
pub mod logging;

/// Run external commands through a swappable runner.
pub use command::{CommandLine, CommandOutput, CommandRunner, SystemRunner, run_checked};
/// Compute the SHA-256 hash of a file.
pub use hash::hash_file;
