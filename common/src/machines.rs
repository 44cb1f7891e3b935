use std::{
    fs,
    net::Ipv4Addr,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    cluster_api::{Cluster, MachineSet},
    error::{ClusterApiError, Result},
    kubeadm::{PkiLocation, Role},
};

/// Address of the first machine; the following ones count up from here.
pub const FIRST_MACHINE_IP: Ipv4Addr = Ipv4Addr::new(10, 10, 10, 11);
pub const MACHINES_FILE: &str = "machines.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    pub hostname: String,
    #[serde(rename = "box")]
    pub image: String,
    pub ip: Ipv4Addr,
    pub cpus: u32,
    pub memory: u32,
    pub roles: Vec<Role>,
}

impl Machine {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

fn machine_ip(n: u32) -> Result<Ipv4Addr> {
    u32::from(FIRST_MACHINE_IP)
        .checked_add(n)
        .map(Ipv4Addr::from)
        .ok_or_else(|| ClusterApiError::Consistency("too many machines".to_owned()))
}

/// Expands machine sets into the machines to create, and derives the cluster
/// topology flags from their roles.
///
/// Nothing is returned, and the cluster flags are meaningless, if any of the
/// topology checks fail.
pub fn get_machines(cluster: &mut Cluster, machine_sets: &[MachineSet]) -> Result<Vec<Machine>> {
    let mut machines = Vec::new();
    let mut n = 0;
    for s in machine_sets {
        for i in 1..=s.replicas {
            let name = if s.replicas == 1 {
                format!("{}-{}", cluster.name, s.name)
            } else {
                format!("{}-{}{}", cluster.name, s.name, i)
            };
            machines.push(Machine {
                hostname: format!("{}-{}.local", cluster.name, name),
                name,
                image: s.image.clone(),
                ip: machine_ip(n)?,
                cpus: s.cpus,
                memory: s.memory,
                roles: s.roles.clone(),
            });
            n += 1;
        }
    }

    let masters = machines.iter().filter(|m| m.has_role(Role::Master)).count();
    let etcds = machines.iter().filter(|m| m.has_role(Role::Etcd)).count();

    if masters == 0 {
        return Err(ClusterApiError::Consistency(
            "At least one Master machine is required".to_owned(),
        ));
    }
    if masters > 1 {
        cluster.highavailability = true;
        if etcds == 0 {
            return Err(ClusterApiError::Consistency(
                "Multi masters requires external etcd".to_owned(),
            ));
        }
        if cluster.pki_location == PkiLocation::Secrets {
            return Err(ClusterApiError::Consistency(
                "Multi masters does not support certificates in secrets yet".to_owned(),
            ));
        }
    }
    if etcds > 0 {
        cluster.external_etcd = true;
    }

    info!(
        "{} machines ({} masters, {} etcd)",
        machines.len(),
        masters,
        etcds
    );
    Ok(machines)
}

/// Stores the machine list in `<tmp>/machines.yml` for the vagrant run.
pub fn write_machines(machines: &[Machine], tmp: &Path) -> Result<PathBuf> {
    fs::create_dir_all(tmp)?;
    let target = tmp.join(MACHINES_FILE);
    fs::write(&target, serde_yaml::to_string(machines)?)?;
    Ok(target)
}

pub fn read_machines(tmp: &Path) -> Result<Vec<Machine>> {
    let target = tmp.join(MACHINES_FILE);
    let text = fs::read_to_string(&target).map_err(|e| ClusterApiError::from(e).in_file(&target))?;
    serde_yaml::from_str(&text).map_err(|e| ClusterApiError::from(e).in_file(&target))
}
