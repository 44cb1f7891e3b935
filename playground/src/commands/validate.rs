use anyhow::Result;
use common::{cluster_api::Cluster, command::GREEN_TICK, kubeadm::Role, machines::Machine};
use console::style;

use crate::args::Cli;

use super::{load_cluster, load_config};

fn roles(m: &Machine) -> String {
    m.roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn subnet(blocks: &[String]) -> String {
    if blocks.is_empty() {
        "-".to_owned()
    } else {
        blocks.join(", ")
    }
}

pub fn summary(cluster: &Cluster, machines: &[Machine]) -> String {
    let mut out = String::new();
    let mut line = |k: &str, v: String| out.push_str(&format!("  {:<22}{}\n", k, v));
    line("name", cluster.name.clone());
    line("version", cluster.version.clone());
    line("controlplane", cluster.controlplane.to_string());
    line("certificateAuthority", cluster.certificate_authority.to_string());
    line("pkiLocation", cluster.pki_location.to_string());
    line("dnsAddon", cluster.dns_addon.to_string());
    line("dnsDomain", cluster.dns_domain.clone());
    line("networkAddon", cluster.network_addon.to_string());
    line("serviceSubnet", subnet(&cluster.service_subnet));
    line("podSubnet", subnet(&cluster.pod_subnet));
    line("kubeletConfig", cluster.kubelet_config.to_string());
    line("highavailability", cluster.highavailability.to_string());
    line("externalEtcd", cluster.external_etcd.to_string());

    out.push('\n');
    for m in machines {
        out.push_str(&format!(
            "  {:<24}{:<16}{:<20}{} cpus, {} MB  [{}]\n",
            m.name,
            m.ip,
            m.image,
            m.cpus,
            m.memory,
            roles(m)
        ));
    }
    out
}

pub fn validate(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let (cluster, machines) = load_cluster(&config, false)?;
    println!(
        "{} {} ({})",
        GREEN_TICK.to_string(),
        style("Cluster api specification is valid").bold(),
        config.spec_pattern()
    );
    print!("{}", summary(&cluster, &machines));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use common::cluster_api::get_cluster;

    use super::*;

    #[test]
    fn summary_lists_settings_and_machines() {
        let mut cluster = get_cluster(
            &serde_yaml::from_str(
                r#"
kind: Cluster
metadata:
  name: kubeadm
spec:
  providerConfig:
    value:
      kubernetes:
        version: v1.10.3
        cni:
          plugin: calico
"#,
            )
            .unwrap(),
        )
        .unwrap();
        cluster.external_etcd = true;
        let machines = vec![Machine {
            name: "kubeadm-master".to_owned(),
            hostname: "kubeadm-kubeadm-master.local".to_owned(),
            image: "ubuntu/xenial64".to_owned(),
            ip: Ipv4Addr::new(10, 10, 10, 11),
            cpus: 2,
            memory: 2048,
            roles: vec![Role::Master, Role::Etcd],
        }];

        let s = summary(&cluster, &machines);
        assert!(s.contains("networkAddon          calico"));
        assert!(s.contains("podSubnet             192.168.0.0/16"));
        assert!(s.contains("serviceSubnet         -"));
        assert!(s.contains("externalEtcd          true"));
        assert!(s.contains("10.10.10.11"));
        assert!(s.contains("[Master, Etcd]"));
    }
}
