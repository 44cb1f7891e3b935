use anyhow::Result;
use common::command::GREEN_TICK;
use tokio::fs;
use tracing::info;

use crate::args::Cli;

use super::{load_config, provider};

pub async fn halt(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    provider(&config)?.halt(&config, cli.verbose).await
}

pub async fn destroy(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    provider(&config)?.destroy(&config, cli.verbose).await
}

pub async fn clean(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    for d in [config.bin_folder(), config.tmp_folder()] {
        if fs::try_exists(&d).await? {
            fs::remove_dir_all(&d).await?;
            info!("removed {}", d.display());
        }
    }
    println!("{} Working folders removed", GREEN_TICK.to_string());
    Ok(())
}
