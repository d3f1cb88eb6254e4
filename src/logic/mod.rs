// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Provisioning steps: host preparation, registry login, branding bundle and
//! container lifecycle, sequenced by [`provision::Provisioner`].

pub mod bundle;
pub mod containers;
pub mod host;
pub mod provision;
pub mod registry;
pub mod retry;
