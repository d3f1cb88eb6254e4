// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Bounded retry with linear backoff for flaky external commands.

use std::time::Duration;

use tracing::warn;

use crate::utils::{CommandLine, CommandOutput, CommandRunner};

/// Run `command` up to `attempts` times, stopping at the first success.
///
/// Before attempt `k` (counting from zero) the function pauses for `k`
/// seconds, so the waits are 0, 1, 2, ... A failed attempt never aborts the
/// run by itself: spawn errors and non-zero exits are both recorded as
/// failures and the next attempt proceeds. The output of the last attempt is
/// returned; callers decide whether a final failure is fatal.
///
/// `pause` is `std::thread::sleep` in production.
pub fn retry(
    attempts: u32,
    runner: &dyn CommandRunner,
    command: &CommandLine,
    mut pause: impl FnMut(Duration),
) -> CommandOutput {
    let mut last = CommandOutput::failure(-1, "command was never attempted");

    for attempt in 0..attempts {
        pause(Duration::from_secs(u64::from(attempt)));

        last = match runner.run(command) {
            Ok(output) => output,
            Err(err) => CommandOutput::failure(-1, format!("{:#}", err)),
        };
        if last.is_success() {
            break;
        }
        warn!(
            command = %command,
            attempt = attempt + 1,
            of = attempts,
            stderr = last.stderr.trim(),
            "attempt failed"
        );
    }

    last
}
