use anyhow::Result;
use tracing::info;

use crate::args::{Cli, CreateArgs};

use super::{ansible::run_playbook, load_cluster, load_config, provider, write_derived_files};

pub async fn create(args: &CreateArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let (cluster, machines) = load_cluster(&config, args.fallback)?;
    write_derived_files(&config, &cluster, &machines)?;

    let p = provider(&config)?;
    p.setup(&config, cli.verbose).await?;
    let ssh_config = p.write_ssh_config(&config).await?;

    if args.fallback || args.skip_ansible {
        info!("Skipping ansible playbook");
        return Ok(());
    }
    run_playbook(&config, &ssh_config, cli.verbose).await
}
