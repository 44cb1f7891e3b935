use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use common::{
    cluster_api::Cluster,
    command::command,
    config::{absolute, PlaygroundConfig},
    import::EXTRA_VARS_OVERRIDE_FILE,
    kubeadm::Role,
    machines::Machine,
};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

pub const INVENTORY_FILE: &str = "inventory.yml";
pub const EXTRA_VARS_FILE: &str = "extra_vars.yml";

const GROUPS: [(&str, Role); 3] = [
    ("masters", Role::Master),
    ("nodes", Role::Node),
    ("etcd", Role::Etcd),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostVars {
    pub ip: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub hosts: BTreeMap<String, HostVars>,
}

/// Groups machines by role; a machine with several roles is in several groups.
pub fn inventory(machines: &[Machine]) -> BTreeMap<String, Item> {
    let mut groups = BTreeMap::new();
    for (group, role) in GROUPS {
        let hosts: BTreeMap<_, _> = machines
            .iter()
            .filter(|m| m.has_role(role))
            .map(|m| {
                (
                    m.name.clone(),
                    HostVars {
                        ip: m.ip.to_string(),
                        hostname: m.hostname.clone(),
                    },
                )
            })
            .collect();
        if !hosts.is_empty() {
            groups.insert(group.to_owned(), Item { hosts });
        }
    }
    groups
}

/// The cluster's provider config plus the topology derived from the machines.
pub fn extra_vars(cluster: &Cluster) -> Mapping {
    let mut vars = cluster.extra_vars.clone();
    vars.insert(Value::from("clusterName"), Value::from(cluster.name.as_str()));
    vars.insert(Value::from("highavailability"), Value::from(cluster.highavailability));
    vars.insert(Value::from("externalEtcd"), Value::from(cluster.external_etcd));
    vars.insert(
        Value::from("networkRequiresSysconf"),
        Value::from(cluster.network_addon.requires_sysconf()),
    );
    vars
}

pub fn write_ansible_files(
    cluster: &Cluster,
    machines: &[Machine],
    tmp: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(tmp)?;

    let inventory_file = tmp.join(INVENTORY_FILE);
    fs::write(&inventory_file, serde_yaml::to_string(&inventory(machines))?)?;

    let extra_vars_file = tmp.join(EXTRA_VARS_FILE);
    fs::write(&extra_vars_file, serde_yaml::to_string(&extra_vars(cluster))?)?;

    Ok((inventory_file, extra_vars_file))
}

/// Arguments for `ansible-playbook`, which runs from the ansible folder, so every
/// path handed to it is absolute.
pub fn playbook_args(config: &PlaygroundConfig) -> Result<Vec<String>> {
    let tmp = absolute(&config.tmp_folder())?;
    let mut args = vec![
        config.playbook.clone(),
        "-i".to_owned(),
        tmp.join(INVENTORY_FILE).display().to_string(),
        "--extra-vars".to_owned(),
        format!("@{}", tmp.join(EXTRA_VARS_FILE).display()),
    ];

    // an imported kubeadm takes precedence over the cluster's extra vars
    let override_file = tmp.join(EXTRA_VARS_OVERRIDE_FILE);
    if override_file.is_file() {
        args.push("--extra-vars".to_owned());
        args.push(format!("@{}", override_file.display()));
    }
    Ok(args)
}

pub async fn run_playbook(config: &PlaygroundConfig, ssh_config: &Path, verbose: bool) -> Result<()> {
    let args = playbook_args(config)?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let ssh_args = format!("-F {}", absolute(ssh_config)?.display());

    let mut env = HashMap::from([
        ("ANSIBLE_HOST_KEY_CHECKING", "False"),
        ("ANSIBLE_SSH_ARGS", ssh_args.as_str()),
    ]);
    if verbose {
        env.insert("DEBUG_ANSIBLE", "1");
    }

    command(
        "ansible-playbook",
        &args,
        verbose,
        [
            "Installing kubernetes",
            "Could not install kubernetes",
            "Kubernetes installed",
        ],
        &config.ansible_folder(),
        env,
    )
    .await
}
