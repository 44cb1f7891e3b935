use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kubeadm-playground")]
#[command(author, version, about = "A local multi-node kubernetes playground driven by a cluster api specification", long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(long, short, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Configuration file
    #[arg(long, short, default_value = "playground.toml")]
    pub file: String,

    /// Cluster api specification, a folder or a glob (overrides the configuration file)
    #[arg(long, short)]
    pub spec: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate the cluster api specification and show the resulting machines
    Validate,
    /// Write the machine list, inventory and extra vars without creating anything
    Machines,
    /// Create machines & install kubernetes
    Create(CreateArgs),
    /// Show the state of every machine
    Status,
    /// SSH into a machine
    Ssh(SshArgs),
    /// Stop machines
    Halt,
    /// Teardown machines
    Destroy,
    /// Remove the working folders
    Clean,
    /// Use a locally built kubeadm for the next `create`
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Bootstrap machines without ansible, using the fallback box
    #[arg(long, action = ArgAction::SetTrue)]
    pub fallback: bool,

    /// Only create machines, do not run the ansible playbook
    #[arg(long, action = ArgAction::SetTrue)]
    pub skip_ansible: bool,
}

#[derive(Debug, Args)]
pub struct SshArgs {
    /// Machine name, as listed by `status`
    pub machine: String,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// How kubernetes was built: bazel, docker or local
    pub builder: String,

    /// Prefix for the imported binary name, to keep several builds side by side
    #[arg(long, short)]
    pub prefix: Option<String>,
}
