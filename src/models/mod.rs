// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: configuration types and validation, free of host side effects.

pub mod config;
pub mod dn;

pub use config::{
    Branding, HostLayout, LdapSettings, LinkPair, ProvisionConfig, RegistryParameters,
};
