use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::{
    accessor::getx,
    error::{ClusterApiError, Result, ValidationError},
    kubeadm::*,
    validators::{self, display, to_integer, Enumeration},
};

pub const KIND_CLUSTER: &str = "Cluster";
pub const KIND_MACHINE_SET: &str = "MachineSet";

pub const DEFAULT_BOX: &str = "ubuntu/xenial64";
/// Box tested with the bootstrap script used when ansible is not available
pub const FALLBACK_BOX: &str = "bento/ubuntu-17.10";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    pub version: String,
    pub controlplane: ControlplaneType,
    pub certificate_authority: CertificateAuthorityType,
    pub pki_location: PkiLocation,
    pub dns_addon: DnsAddon,
    pub dns_domain: String,
    pub network_addon: NetworkAddon,
    pub service_subnet: Vec<String>,
    pub pod_subnet: Vec<String>,
    pub kubelet_config: KubeletConfigType,
    /// The whole `providerConfig.value`, with the effective network settings merged
    /// in under `kubernetes`, handed to ansible as extra vars.
    pub extra_vars: Mapping,
    /// More than one Master machine, set by [`crate::machines::get_machines`]
    pub highavailability: bool,
    /// At least one Etcd machine, set by [`crate::machines::get_machines`]
    pub external_etcd: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSet {
    pub name: String,
    pub replicas: u32,
    #[serde(rename = "box")]
    pub image: String,
    pub cpus: u32,
    pub memory: u32,
    pub roles: Vec<Role>,
}

fn string(value: &Value) -> String {
    display(value)
}

fn count(value: &Value) -> Result<u32> {
    let n = to_integer(value)?;
    u32::try_from(n).map_err(|_| ValidationError::Integer(display(value)).into())
}

/// Single CIDR strings and lists are both accepted; `null` means no value.
fn blocks(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(s) => s.iter().map(display).collect(),
        v => vec![display(v)],
    }
}

fn enumeration<T: Enumeration>(data: &Value, path: &str, default: T) -> Result<T> {
    let v = getx(
        data,
        path,
        Some(Value::from(default.as_str())),
        Some(validators::one_of::<T>),
    )?;
    v.as_str().and_then(T::parse).ok_or_else(|| {
        ValidationError::NotAllowed {
            kind: T::KIND,
            value: display(&v),
            allowed: T::VALUES,
        }
        .into()
    })
}

fn subnet(data: &Value, path: &str, default: Option<&str>) -> Result<Vec<String>> {
    let v = getx(
        data,
        path,
        Some(default.map(Value::from).unwrap_or(Value::Null)),
        Some(validators::cidrs),
    )?;
    Ok(blocks(&v))
}

fn set_kubernetes_var(extra_vars: &mut Mapping, key: &str, value: Value) {
    let kubernetes = extra_vars
        .entry(Value::from("kubernetes"))
        .or_insert(Value::Mapping(Mapping::new()));
    if !kubernetes.is_mapping() {
        *kubernetes = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(vars) = kubernetes {
        vars.insert(Value::from(key), value);
    }
}

/// Builds the cluster definition from a `kind: Cluster` document.
pub fn get_cluster(data: &Value) -> Result<Cluster> {
    const K8S: &str = "spec.providerConfig.value.kubernetes";

    let name = getx(data, "metadata.name", None, Some(validators::rfc1123_label))?;
    let version = getx(data, &format!("{K8S}.version"), None, Some(validators::string))?;
    let controlplane = enumeration(data, &format!("{K8S}.controlplane"), ControlplaneType::StaticPods)?;
    let certificate_authority = enumeration(
        data,
        &format!("{K8S}.certificateAuthority"),
        CertificateAuthorityType::Local,
    )?;
    let pki_location = enumeration(data, &format!("{K8S}.pkiLocation"), PkiLocation::Filesystem)?;
    let dns_addon = enumeration(data, &format!("{K8S}.dnsAddon"), DnsAddon::KubeDns)?;
    let dns_domain = getx(
        data,
        "spec.clusterNetwork.serviceDomain",
        Some(Value::from(DEFAULT_DNS_DOMAIN)),
        Some(validators::rfc1123_subdomain),
    )?;
    let network_addon = enumeration(data, &format!("{K8S}.cni.plugin"), NetworkAddon::Weavenet)?;
    let (default_service, default_pod) = network_addon.default_subnets();
    let service_subnet = subnet(data, "spec.clusterNetwork.services.cidrblocks", default_service)?;
    let pod_subnet = subnet(data, "spec.clusterNetwork.pods.cidrblocks", default_pod)?;
    let kubelet_config = enumeration(
        data,
        &format!("{K8S}.kubeletConfig"),
        KubeletConfigType::SystemdDropIn,
    )?;

    let mut extra_vars = match getx(data, "spec.providerConfig.value", None, None)? {
        Value::Mapping(m) => m,
        other => {
            return Err(ValidationError::Type {
                expected: "a mapping at spec.providerConfig.value",
                value: display(&other),
            }
            .into())
        }
    };

    let dns_domain = string(&dns_domain);
    if dns_domain != DEFAULT_DNS_DOMAIN {
        set_kubernetes_var(&mut extra_vars, "dnsDomain", Value::from(dns_domain.as_str()));
    }
    if let Some(s) = service_subnet.first() {
        set_kubernetes_var(&mut extra_vars, "serviceSubnet", Value::from(s.as_str()));
    }
    if let Some(s) = pod_subnet.first() {
        set_kubernetes_var(&mut extra_vars, "podSubnet", Value::from(s.as_str()));
    }

    if pki_location == PkiLocation::Secrets && controlplane != ControlplaneType::SelfHosting {
        return Err(ClusterApiError::Consistency(
            "PKILocation can be secrets only if controlplane is self hosted".to_owned(),
        ));
    }

    Ok(Cluster {
        name: string(&name),
        version: string(&version),
        controlplane,
        certificate_authority,
        pki_location,
        dns_addon,
        dns_domain,
        network_addon,
        service_subnet,
        pod_subnet,
        kubelet_config,
        extra_vars,
        highavailability: false,
        external_etcd: false,
    })
}

/// Builds a machine set definition from a `kind: MachineSet` document.
pub fn get_machine_set(data: &Value) -> Result<MachineSet> {
    const PROVIDER: &str = "spec.template.spec.providerConfig.value";

    let name = getx(data, "metadata.name", None, Some(validators::rfc1123_label))?;
    let replicas = getx(data, "spec.replicas", Some(Value::from(1)), Some(validators::positive_integer))?;
    let image = getx(data, &format!("{PROVIDER}.box"), Some(Value::from(DEFAULT_BOX)), None)?;
    let cpus = getx(data, &format!("{PROVIDER}.cpus"), Some(Value::from(2)), Some(validators::integer))?;
    let memory = getx(
        data,
        &format!("{PROVIDER}.memory"),
        Some(Value::from(2048)),
        Some(validators::integer),
    )?;
    let roles = getx(data, "spec.template.spec.roles", None, Some(validators::all_of::<Role>))?;

    let mut parsed: Vec<Role> = Vec::new();
    for r in roles.as_sequence().into_iter().flatten() {
        if let Some(role) = r.as_str().and_then(Role::parse) {
            if !parsed.contains(&role) {
                parsed.push(role);
            }
        }
    }

    Ok(MachineSet {
        name: string(&name),
        replicas: count(&replicas)?,
        image: string(&image),
        cpus: count(&cpus)?,
        memory: count(&memory)?,
        roles: parsed,
    })
}

fn parse_document(
    data: &Value,
    cluster: &mut Option<Cluster>,
    machine_sets: &mut Vec<MachineSet>,
) -> Result<()> {
    let kind = getx(data, "kind", None, None)?;
    match kind.as_str() {
        Some(KIND_CLUSTER) => {
            if cluster.is_some() {
                return Err(ClusterApiError::Consistency(
                    "Cluster object defined more than once".to_owned(),
                ));
            }
            *cluster = Some(get_cluster(data)?);
        }
        Some(KIND_MACHINE_SET) => machine_sets.push(get_machine_set(data)?),
        _ => debug!("ignoring document of kind {}", validators::display(&kind)),
    }
    Ok(())
}

fn parse_file(
    file: &Path,
    cluster: &mut Option<Cluster>,
    machine_sets: &mut Vec<MachineSet>,
) -> Result<()> {
    let text = fs::read_to_string(file)?;
    for document in serde_yaml::Deserializer::from_str(&text) {
        let data = Value::deserialize(document)?;
        if data.is_null() {
            continue;
        }
        parse_document(&data, cluster, machine_sets)?;
    }
    Ok(())
}

/// Parses the cluster api definition found in `pattern`, a directory or a glob.
///
/// Files are visited in path order, so the machine set order (and hence machine
/// names and IPs) is stable for a given directory.
pub fn parse(pattern: &str) -> Result<(Cluster, Vec<MachineSet>)> {
    let glob_pattern = if Path::new(pattern).is_dir() {
        format!("{}/*", pattern.trim_end_matches('/'))
    } else {
        pattern.to_owned()
    };

    let config_error = |reason: String| ClusterApiError::Config {
        pattern: pattern.to_owned(),
        reason,
    };

    let mut cluster = None;
    let mut machine_sets = Vec::new();

    // dotfiles (editor swap files, .DS_Store) are never part of the specification
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };
    let paths =
        glob::glob_with(&glob_pattern, options).map_err(|e| config_error(e.to_string()))?;
    for entry in paths {
        let file = entry.map_err(|e| config_error(e.to_string()))?;
        if !file.is_file() {
            continue;
        }
        debug!("parsing {}", file.display());
        parse_file(&file, &mut cluster, &mut machine_sets).map_err(|e| e.in_file(&file))?;
    }

    let Some(cluster) = cluster else {
        return Err(config_error("Cluster object not defined".to_owned()));
    };
    if machine_sets.is_empty() {
        return Err(config_error("MachineSets objects not defined".to_owned()));
    }

    info!(
        "cluster {} parsed with {} machine sets",
        cluster.name,
        machine_sets.len()
    );
    Ok((cluster, machine_sets))
}

/// Switches every machine set to the box the non-ansible bootstrap is tested with.
pub fn fallback_settings(machine_sets: &mut [MachineSet]) {
    for s in machine_sets {
        s.image = FALLBACK_BOX.to_owned();
    }
}
