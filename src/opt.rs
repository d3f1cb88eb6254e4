// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Command-line options. Every option can also come from a `GUAC_*` variable.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;

pub const DEFAULT_AUDIT_LOG_PATH: &str = "/var/log/guacamole-setup.log";
pub const DEFAULT_STAGING_DIR: &str = "/tmp/guacamole-branding";
pub const DEFAULT_HOME_DIR: &str = "/opt/guacamole/home";
pub const DEFAULT_DATA_DIR: &str = "/opt/guacamole/drive";

#[derive(Debug, clap::Parser, Clone)]
#[clap(
    name = "guacamole-setup",
    about = "Provision the Apache Guacamole gateway containers on this host"
)]
pub struct Opt {
    /// Hostname of the LDAP server. Requires --domain-dn.
    #[clap(short = 'H', long, env = "GUAC_LDAP_HOSTNAME")]
    pub ldap_hostname: Option<String>,

    /// Distinguished name of the directory, e.g. DC=example,DC=com. Requires --ldap-hostname.
    #[clap(short = 'D', long, env = "GUAC_LDAP_DOMAIN_DN")]
    pub domain_dn: Option<String>,

    /// Base DN for users, relative to the domain DN.
    #[clap(short = 'U', long, env = "GUAC_LDAP_USERS_DN", default_value = "CN=Users")]
    pub users_dn: String,

    /// Base DN for roles, relative to the domain DN. Enables role-based access.
    #[clap(short = 'R', long, env = "GUAC_LDAP_ROLES_DN")]
    pub roles_dn: Option<String>,

    /// Attribute holding the username.
    #[clap(short = 'A', long, env = "GUAC_LDAP_USER_ATTRIBUTE", default_value = "cn")]
    pub user_attribute: String,

    /// Base DN for connection configurations, relative to the domain DN.
    #[clap(
        short = 'C',
        long,
        env = "GUAC_LDAP_CONFIG_DN",
        default_value = "CN=GuacConfigGroups"
    )]
    pub config_dn: String,

    /// LDAP server port.
    #[clap(short = 'P', long, env = "GUAC_LDAP_PORT", default_value_t = 389)]
    pub ldap_port: u16,

    /// URL of the primary login-page link. Requires --primary-link-label.
    #[clap(short = 'L', long, env = "GUAC_PRIMARY_LINK_URL")]
    pub primary_link_url: Option<String>,

    /// Label of the primary login-page link. Requires --primary-link-url.
    #[clap(short = 'l', long, env = "GUAC_PRIMARY_LINK_LABEL")]
    pub primary_link_label: Option<String>,

    /// URL of the secondary login-page link. Requires --secondary-link-label.
    #[clap(short = 'S', long, env = "GUAC_SECONDARY_LINK_URL")]
    pub secondary_link_url: Option<String>,

    /// Label of the secondary login-page link. Requires --secondary-link-url.
    #[clap(short = 's', long, env = "GUAC_SECONDARY_LINK_LABEL")]
    pub secondary_link_label: Option<String>,

    /// Application name shown on the login page.
    #[clap(short = 'B', long, env = "GUAC_BRAND", default_value = "Apache Guacamole")]
    pub brand: String,

    /// Image reference for the web application container.
    #[clap(
        short = 'G',
        long,
        env = "GUAC_FRONTEND_IMAGE",
        default_value = "guacamole/guacamole"
    )]
    pub frontend_image: String,

    /// Image reference for the guacd protocol daemon container.
    #[clap(
        short = 'g',
        long,
        env = "GUAC_BACKEND_IMAGE",
        default_value = "guacamole/guacd"
    )]
    pub backend_image: String,

    /// Parameter-store path holding the registry username.
    #[clap(short = 'u', long, env = "GUAC_REGISTRY_USER_PARAM")]
    pub registry_user_param: Option<String>,

    /// Parameter-store path holding the registry password.
    #[clap(short = 'p', long, env = "GUAC_REGISTRY_PASSWORD_PARAM")]
    pub registry_password_param: Option<String>,

    /// File receiving a copy of every log line.
    #[clap(long, env = "GUAC_SETUP_AUDIT_LOG", value_parser, default_value_os_t = DEFAULT_AUDIT_LOG_PATH.into())]
    pub audit_log: PathBuf,

    /// Directory the branding bundle is assembled in.
    #[clap(long, hide = true, env = "GUAC_SETUP_STAGING_DIR", value_parser, default_value_os_t = DEFAULT_STAGING_DIR.into())]
    pub staging_dir: PathBuf,

    /// Host directory mounted as GUACAMOLE_HOME in the web application.
    #[clap(long, hide = true, env = "GUAC_SETUP_HOME_DIR", value_parser, default_value_os_t = DEFAULT_HOME_DIR.into())]
    pub home_dir: PathBuf,

    /// Host directory shared by both containers as /drive.
    #[clap(long, hide = true, env = "GUAC_SETUP_DATA_DIR", value_parser, default_value_os_t = DEFAULT_DATA_DIR.into())]
    pub data_dir: PathBuf,
}

/// Print a parse error or help text and pick the process exit code.
///
/// Help and version requests succeed; every other parse error exits with 1.
pub fn exit_for_parse_error(err: clap::Error) -> ExitCode {
    // Printing only fails when stdout/stderr are gone; nothing left to report to.
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
