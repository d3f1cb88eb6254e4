//! Application entry point wiring parsed options to a provisioning run.

use anyhow::Result;
use tracing::info;

use crate::logic::provision::Provisioner;
use crate::models::ProvisionConfig;
use crate::opt::Opt;
use crate::utils::SystemRunner;

/// Validate the options and provision this host with real commands.
///
/// Validation happens before any directory or container is touched.
pub fn run(opt: &Opt) -> Result<()> {
    let config = ProvisionConfig::from_opt(opt)?;
    info!(
        frontend = %config.images.frontend,
        backend = %config.images.backend,
        ldap = config.ldap.is_some(),
        links = config.branding.links.len(),
        "starting guacamole provisioning"
    );
    Provisioner::new(&config, &SystemRunner, std::thread::sleep).run()
}
