//! MongoDB user bootstrap
//!
//! Runs once against a fresh instance, usually from the container
//! entrypoint, and creates the configured user in the target database.
//! A second run fails with "already exists" and exits non-zero.
//!
//! Usage: `init-mongo [create|verify]`

use anyhow::{anyhow, Context, Result};
use common::init_logging;
use mongo_bootstrap::{BootstrapConfig, BootstrapStatement, Verification};
use std::env;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    /// Read-only check that the user exists with the configured grants.
    Verify,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("create") => Ok(Self::Create),
            Some("verify") => Ok(Self::Verify),
            Some(other) => Err(anyhow!(
                "Unknown mode {:?}. Usage: init-mongo [create|verify]",
                other
            )),
        }
    }
}

async fn run(mode: Mode) -> Result<()> {
    let config = BootstrapConfig::load().context("Failed to load configuration")?;
    let (statement, catalog) = BootstrapStatement::prepare(config).await?;

    match mode {
        Mode::Create => statement.execute(&catalog).await?,
        Mode::Verify => match statement.verify(&catalog).await? {
            Verification::Verified => {}
            Verification::Missing => {
                return Err(anyhow!(
                    "User {:?} not found in {:?}",
                    statement.user().name,
                    statement.database()
                ))
            }
            Verification::Mismatch { granted } => {
                return Err(anyhow!(
                    "User {:?} has {} grant(s), expected {}",
                    statement.user().name,
                    granted.len(),
                    statement.user().roles.len()
                ))
            }
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _guard = init_logging("init-mongo");

    let start = Instant::now();
    let arg = env::args().nth(1);

    let mode = match Mode::from_arg(arg.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            error!(error = %e, "Invalid arguments");
            std::process::exit(1);
        }
    };

    info!(mode = ?mode, "MongoDB bootstrap starting...");

    if let Err(e) = run(mode).await {
        let kind = e
            .downcast_ref::<mongo_bootstrap::BootstrapError>()
            .map(|b| b.kind())
            .unwrap_or("other");
        error!(error = %format!("{:#}", e), kind, "MongoDB bootstrap failed");
        std::process::exit(1);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(duration_ms, "MongoDB bootstrap completed");
}
