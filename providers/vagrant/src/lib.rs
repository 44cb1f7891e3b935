use std::{collections::HashMap, path::PathBuf};

use anyhow::Result;
use common::{
    command::{command, interactive, output},
    config::PlaygroundConfig,
    exit,
    provider::*,
};
use tokio::fs;
use tracing::info;

pub const SSH_CONFIG_FILE: &str = "ssh_config";

pub struct Vagrant;

/// Reads machine states out of `vagrant status`.
///
/// The first two lines are headers; a state is either one word (`running`) or
/// two (`not created`), followed by the provider in parentheses.
pub fn parse_status(status: &str) -> MachineStates {
    let mut states = MachineStates::new();
    for line in status.lines().skip(2) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.len() {
            3 => {
                states.insert(parts[0].to_owned(), parts[1].to_owned());
            }
            4 => {
                states.insert(parts[0].to_owned(), parts[1..3].join(" "));
            }
            _ => {}
        }
    }
    states
}

async fn vagrant(config: &PlaygroundConfig, args: &[&str], verbose: bool, msgs: [&str; 3]) -> Result<()> {
    command(
        "vagrant",
        args,
        verbose,
        msgs,
        &config.root,
        HashMap::<String, String>::new(),
    )
    .await
}

#[async_trait::async_trait]
impl Provider for Vagrant {
    async fn setup(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()> {
        vagrant(config, &["up", "--parallel"], verbose, SETUP).await
    }

    async fn status(&self, config: &PlaygroundConfig) -> Result<MachineStates> {
        let out = output("vagrant", &["status"], &config.root).await?;
        Ok(parse_status(&out))
    }

    async fn halt(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()> {
        vagrant(config, &["halt"], verbose, HALT).await
    }

    async fn destroy(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()> {
        vagrant(config, &["destroy", "-f"], verbose, DESTROY).await
    }

    async fn ssh(&self, config: &PlaygroundConfig, machine: &str) -> Result<()> {
        let states = self.status(config).await?;
        match states.get(machine).map(String::as_str) {
            Some("running") => {}
            Some(state) => exit!(
                format!("machine {machine} is {state}"),
                "Could not ssh into {}",
                machine
            ),
            None => exit!(format!("unknown machine {machine}"), "Could not ssh into {}", machine),
        }
        interactive("vagrant", &["ssh", machine], &config.root).await
    }

    async fn write_ssh_config(&self, config: &PlaygroundConfig) -> Result<PathBuf> {
        let out = output("vagrant", &["ssh-config"], &config.root).await?;
        let tmp = config.tmp_folder();
        fs::create_dir_all(&tmp).await?;
        let target = tmp.join(SSH_CONFIG_FILE);
        fs::write(&target, out).await?;
        info!("ssh config written to {}", target.display());
        Ok(target)
    }

    fn name(&self) -> String {
        "vagrant".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Current machine states:

kubeadm-master            running (virtualbox)
kubeadm-node1             not created (virtualbox)
kubeadm-node2             poweroff (virtualbox)

This environment represents multiple VMs. The VMs are all listed
above with their current state. For more information about a specific
VM, run `vagrant status NAME`.
";

    #[test]
    fn status_lines() {
        let states = parse_status(STATUS);
        assert_eq!(states.len(), 3);
        assert_eq!(states["kubeadm-master"], "running");
        assert_eq!(states["kubeadm-node1"], "not created");
        assert_eq!(states["kubeadm-node2"], "poweroff");
    }

    #[test]
    fn status_headers_only() {
        assert!(parse_status("Current machine states:\n\n").is_empty());
        assert!(parse_status("").is_empty());
    }
}
