//! # EcoWatch Entry Point
//!
//! Runs one synchronization pass over the fixture services and prints the
//! composed store snapshot.
//!
//! ```text
//! ecowatch [CONFIG_PATH]
//!
//!   CONFIG_PATH   ecowatch.toml to load instead of the platform default
//!   RUST_LOG      tracing filter, default "info,ecowatch=debug"
//! ```

use std::path::PathBuf;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecowatch_app::init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    ecowatch_app::run(config_path)
        .await
        .context("EcoWatch failed to start")?;

    Ok(())
}
