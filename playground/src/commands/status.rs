use anyhow::Result;
use common::machines::read_machines;
use console::style;

use crate::args::{Cli, SshArgs};

use super::{load_config, provider};

pub async fn status(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let states = provider(&config)?.status(&config).await?;

    // tmp/machines.yml is only there after `machines` or `create`
    let machines = read_machines(&config.tmp_folder()).unwrap_or_default();
    for (name, state) in &states {
        let ip = machines
            .iter()
            .find(|m| &m.name == name)
            .map(|m| m.ip.to_string())
            .unwrap_or_default();
        let state = if state == "running" {
            style(state.as_str()).green()
        } else {
            style(state.as_str()).yellow()
        };
        println!("{:<24}{:<16}{}", name, ip, state);
    }
    Ok(())
}

pub async fn ssh(args: &SshArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    provider(&config)?.ssh(&config, &args.machine).await
}
