// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Validated provisioning configuration (UI-agnostic).
//!
//! [`ProvisionConfig::from_opt`] is the only constructor: it enforces the
//! flag-pair rules and produces a value that is never mutated afterwards.

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::models::dn::DistinguishedName;
use crate::opt::Opt;

/// Which of the two login-page links a pair belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkSlot {
    Primary,
    Secondary,
}

impl LinkSlot {
    fn flags(&self) -> (&'static str, &'static str) {
        match self {
            LinkSlot::Primary => ("-L/--primary-link-url", "-l/--primary-link-label"),
            LinkSlot::Secondary => ("-S/--secondary-link-url", "-s/--secondary-link-label"),
        }
    }
}

/// Flag combinations that are rejected before anything touches the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LDAP hostname (-H) and domain DN (-D) must be given together; only {given} was set")]
    LdapPairMismatch { given: &'static str },
    #[error("{url_flag} and {label_flag} must be given together")]
    LinkPairMismatch {
        slot: LinkSlot,
        url_flag: &'static str,
        label_flag: &'static str,
    },
}

/// LDAP connection settings for the web application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdapSettings {
    pub hostname: String,
    pub port: u16,
    pub domain: DistinguishedName,
    pub users_base: DistinguishedName,
    /// Present only when role-based access is enabled.
    pub roles_base: Option<DistinguishedName>,
    pub config_base: DistinguishedName,
    pub username_attribute: String,
}

impl LdapSettings {
    pub fn user_base_dn(&self) -> DistinguishedName {
        self.users_base.under(&self.domain)
    }

    pub fn config_base_dn(&self) -> DistinguishedName {
        self.config_base.under(&self.domain)
    }

    /// Empty unless a roles base DN was configured.
    pub fn group_base_dn(&self) -> DistinguishedName {
        self.roles_base
            .as_ref()
            .map(|roles| roles.under(&self.domain))
            .unwrap_or_default()
    }
}

/// One anchor on the login page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPair {
    pub url: String,
    pub label: String,
}

impl LinkPair {
    /// True when the URL parses as an absolute URL. Relative values are still
    /// written verbatim; callers only warn.
    pub fn is_absolute_url(&self) -> bool {
        Url::parse(&self.url).is_ok()
    }
}

/// Content of the branding bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branding {
    pub brand: String,
    /// Configured links, primary before secondary.
    pub links: Vec<LinkPair>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Images {
    pub frontend: String,
    pub backend: String,
}

/// Parameter-store paths for the registry credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryParameters {
    pub username_path: Option<String>,
    pub password_path: Option<String>,
}

/// The three host directories recreated on every run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostLayout {
    /// Scratch directory the branding bundle is assembled in.
    pub staging: PathBuf,
    /// Mounted into the web application as GUACAMOLE_HOME.
    pub home: PathBuf,
    /// Mounted into both containers as /drive.
    pub data: PathBuf,
}

impl HostLayout {
    pub fn new(staging: &Path, home: &Path, data: &Path) -> Self {
        Self {
            staging: staging.to_path_buf(),
            home: home.to_path_buf(),
            data: data.to_path_buf(),
        }
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.home.join("extensions")
    }

    /// Where the web application's extension loader picks up the bundle.
    pub fn extension_archive(&self) -> PathBuf {
        self.extensions_dir().join("branding.jar")
    }
}

/// Everything one provisioning run needs, fixed at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// `None` when LDAP authentication is not configured.
    pub ldap: Option<LdapSettings>,
    /// A roles base DN given without LDAP; accepted but ignored.
    pub ignored_roles_dn: Option<String>,
    pub branding: Branding,
    pub images: Images,
    pub registry: RegistryParameters,
    pub layout: HostLayout,
}

impl ProvisionConfig {
    /// Validate the parsed options and build the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when exactly one half of the LDAP pair or of a
    /// link pair is present. Empty strings count as absent.
    pub fn from_opt(opt: &Opt) -> Result<Self, ConfigError> {
        let hostname = present(&opt.ldap_hostname);
        let domain = present(&opt.domain_dn);
        let roles = present(&opt.roles_dn);

        let (ldap, ignored_roles_dn) = match (hostname, domain) {
            (Some(hostname), Some(domain)) => (
                Some(LdapSettings {
                    hostname: hostname.to_string(),
                    port: opt.ldap_port,
                    domain: DistinguishedName::new(domain),
                    users_base: DistinguishedName::new(&opt.users_dn),
                    roles_base: roles.map(DistinguishedName::new),
                    config_base: DistinguishedName::new(&opt.config_dn),
                    username_attribute: opt.user_attribute.clone(),
                }),
                None,
            ),
            (None, None) => (None, roles.map(str::to_string)),
            (Some(_), None) => return Err(ConfigError::LdapPairMismatch { given: "-H" }),
            (None, Some(_)) => return Err(ConfigError::LdapPairMismatch { given: "-D" }),
        };

        let mut links = Vec::with_capacity(2);
        for (slot, url, label) in [
            (
                LinkSlot::Primary,
                &opt.primary_link_url,
                &opt.primary_link_label,
            ),
            (
                LinkSlot::Secondary,
                &opt.secondary_link_url,
                &opt.secondary_link_label,
            ),
        ] {
            if let Some(pair) = link_pair(slot, url, label)? {
                links.push(pair);
            }
        }

        Ok(Self {
            ldap,
            ignored_roles_dn,
            branding: Branding {
                brand: opt.brand.clone(),
                links,
            },
            images: Images {
                frontend: opt.frontend_image.clone(),
                backend: opt.backend_image.clone(),
            },
            registry: RegistryParameters {
                username_path: present(&opt.registry_user_param).map(str::to_string),
                password_path: present(&opt.registry_password_param).map(str::to_string),
            },
            layout: HostLayout::new(&opt.staging_dir, &opt.home_dir, &opt.data_dir),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn link_pair(
    slot: LinkSlot,
    url: &Option<String>,
    label: &Option<String>,
) -> Result<Option<LinkPair>, ConfigError> {
    match (present(url), present(label)) {
        (Some(url), Some(label)) => Ok(Some(LinkPair {
            url: url.to_string(),
            label: label.to_string(),
        })),
        (None, None) => Ok(None),
        _ => {
            let (url_flag, label_flag) = slot.flags();
            Err(ConfigError::LinkPairMismatch {
                slot,
                url_flag,
                label_flag,
            })
        }
    }
}
