use std::collections::BTreeMap;

use anyhow::Result;

use crate::config::PlaygroundConfig;

pub const SETUP: [&str; 3] = [
    "Spinning up machines",
    "Could not setup machines",
    "Machines up",
];

pub const HALT: [&str; 3] = [
    "Halting machines",
    "Could not halt machines",
    "Machines halted",
];

pub const DESTROY: [&str; 3] = [
    "Tearing down machines",
    "Could not destroy machines",
    "Destroyed machines",
];

/// Machine name to provider state, e.g. `kubeadm-master` -> `running`
pub type MachineStates = BTreeMap<String, String>;

/// Something able to bring the machines in `<tmp>/machines.yml` to life.
#[async_trait::async_trait]
pub trait Provider {
    async fn setup(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()>;
    async fn status(&self, config: &PlaygroundConfig) -> Result<MachineStates>;
    async fn halt(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()>;
    async fn destroy(&self, config: &PlaygroundConfig, verbose: bool) -> Result<()>;
    /// Opens a shell on `machine`
    async fn ssh(&self, config: &PlaygroundConfig, machine: &str) -> Result<()>;
    /// Writes the ssh connection info ansible uses, returning where it went
    async fn write_ssh_config(&self, config: &PlaygroundConfig) -> Result<std::path::PathBuf>;
    fn name(&self) -> String;
}
