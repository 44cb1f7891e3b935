use anyhow::Result;
use common::{
    cluster_api::{self, Cluster},
    config::{parse_config, PlaygroundConfig},
    exit,
    machines::{get_machines, write_machines, Machine},
    provider::Provider,
};
use tracing::info;

use crate::args::Cli;

pub mod ansible;
pub mod create;
pub mod destroy;
pub mod import;
pub mod status;
pub mod validate;

pub const PROVIDERS: &[&'static dyn Provider] = &[&vagrant::Vagrant];

pub fn load_config(cli: &Cli) -> Result<PlaygroundConfig> {
    let mut config = parse_config(&cli.file)?;
    if let Some(spec) = &cli.spec {
        config.spec = spec.clone();
    }
    Ok(config)
}

pub fn provider(config: &PlaygroundConfig) -> Result<&'static dyn Provider> {
    match PROVIDERS.iter().find(|p| p.name() == config.provider) {
        Some(p) => Ok(*p),
        None => exit!(
            format!("Unknown provider {}", config.provider),
            "Could not find provider {}",
            config.provider
        ),
    }
}

/// Reads the cluster api specification and expands it into machines.
pub fn load_cluster(
    config: &PlaygroundConfig,
    fallback: bool,
) -> Result<(Cluster, Vec<Machine>)> {
    let pattern = config.spec_pattern();
    let (mut cluster, mut machine_sets) = match cluster_api::parse(&pattern) {
        Ok(c) => c,
        Err(err) => exit!(err, "Invalid cluster api specification in {}", pattern),
    };
    if fallback {
        cluster_api::fallback_settings(&mut machine_sets);
    }

    let machines = match get_machines(&mut cluster, &machine_sets) {
        Ok(m) => m,
        Err(err) => exit!(err, "Invalid cluster definition in {}", pattern),
    };
    Ok((cluster, machines))
}

/// Writes everything the provider and ansible read from the tmp folder.
pub fn write_derived_files(
    config: &PlaygroundConfig,
    cluster: &Cluster,
    machines: &[Machine],
) -> Result<()> {
    let tmp = config.tmp_folder();
    let machines_file = write_machines(machines, &tmp)?;
    info!("machines written to {}", machines_file.display());
    let (inventory, extra_vars) = ansible::write_ansible_files(cluster, machines, &tmp)?;
    info!(
        "inventory written to {}, extra vars to {}",
        inventory.display(),
        extra_vars.display()
    );
    Ok(())
}

pub fn machines(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let (cluster, machines) = load_cluster(&config, false)?;
    write_derived_files(&config, &cluster, &machines)?;
    println!(
        "{} {} machines written to {}",
        common::command::GREEN_TICK.to_string(),
        machines.len(),
        config.tmp_folder().display()
    );
    Ok(())
}
