use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validators::Enumeration;

pub const DEFAULT_DNS_DOMAIN: &str = "cluster.local";

macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl Enumeration for $name {
            const KIND: &'static str = $kind;
            const VALUES: &'static [&'static str] = &[$($value,)+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

enumeration! {
    /// How the control plane components are deployed
    ControlplaneType, "controlplane type" {
        StaticPods => "staticPods",
        SelfHosting => "selfHosting",
    }
}

enumeration! {
    CertificateAuthorityType, "certificateauthority type" {
        Local => "local",
        External => "external",
    }
}

enumeration! {
    /// Where the cluster PKI is stored
    PkiLocation, "certificateauthority location" {
        Filesystem => "filesystem",
        Secrets => "secrets",
    }
}

enumeration! {
    DnsAddon, "DNS add-on" {
        KubeDns => "kubeDNS",
        CoreDns => "coreDNS",
    }
}

enumeration! {
    NetworkAddon, "network add-on" {
        Weavenet => "weavenet",
        Flannel => "flannel",
        Calico => "calico",
    }
}

enumeration! {
    /// `dynamicKubeletConfig` is the systemd drop-in plus dynamic kubelet config
    KubeletConfigType, "kubelet config type" {
        SystemdDropIn => "systemdDropIn",
        DynamicKubeletConfig => "dynamicKubeletConfig",
    }
}

enumeration! {
    Role, "machine set role" {
        Master => "Master",
        Node => "Node",
        Etcd => "Etcd",
    }
}

enumeration! {
    /// How a local kubernetes checkout was built, see [`crate::import`]
    Builder, "builder type" {
        Bazel => "bazel",
        Docker => "docker",
        Local => "local",
    }
}

impl NetworkAddon {
    /// Service and pod subnets the add-on expects when none are configured.
    pub fn default_subnets(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            NetworkAddon::Weavenet => (None, None),
            NetworkAddon::Flannel => (None, Some("10.244.0.0/16")),
            NetworkAddon::Calico => (None, Some("192.168.0.0/16")),
        }
    }

    /// Whether nodes need `net.bridge.bridge-nf-call-iptables` set for this add-on.
    pub fn requires_sysconf(&self) -> bool {
        match self {
            NetworkAddon::Weavenet | NetworkAddon::Flannel => true,
            NetworkAddon::Calico => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings_round_trip() {
        for v in ControlplaneType::VALUES {
            assert_eq!(ControlplaneType::parse(v).unwrap().as_str(), *v);
        }
        assert_eq!(DnsAddon::parse("coreDNS"), Some(DnsAddon::CoreDns));
        assert_eq!(DnsAddon::parse("coredns"), None);
        assert_eq!(Role::VALUES, &["Master", "Node", "Etcd"]);
    }

    #[test]
    fn serde_uses_cluster_api_spelling() {
        assert_eq!(serde_yaml::to_string(&PkiLocation::Secrets).unwrap().trim(), "secrets");
        let r: KubeletConfigType = serde_yaml::from_str("dynamicKubeletConfig").unwrap();
        assert_eq!(r, KubeletConfigType::DynamicKubeletConfig);
    }

    #[test]
    fn network_addon_defaults() {
        assert_eq!(NetworkAddon::Weavenet.default_subnets(), (None, None));
        assert_eq!(NetworkAddon::Flannel.default_subnets().1, Some("10.244.0.0/16"));
        assert_eq!(NetworkAddon::Calico.default_subnets().1, Some("192.168.0.0/16"));
        assert!(NetworkAddon::Flannel.requires_sysconf());
        assert!(!NetworkAddon::Calico.requires_sysconf());
    }
}
