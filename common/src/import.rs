//! Imports a locally built `kubeadm` into the playground, so the cluster is
//! created with it instead of the released binary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde_yaml::{Mapping, Value};
use tracing::info;

use crate::{config::PlaygroundConfig, exit, kubeadm::Builder};

pub const EXTRA_VARS_OVERRIDE_FILE: &str = "extra_vars_override.yml";

/// Where the `bin` folder is mounted inside the machines.
pub const GUEST_BIN_FOLDER: &str = "/vagrant/bin";

/// Folder holding the kubeadm binary produced by `builder`.
///
/// The kubernetes checkout is expected under `<go path>/src/k8s.io/kubernetes`, where the
/// go path is `KUBEADM_BUILD_ROOT`, then `GOPATH`, then `$HOME/go`.
pub fn build_output_path<F>(builder: Builder, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let go_path = env("KUBEADM_BUILD_ROOT")
        .or_else(|| env("GOPATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env("HOME").unwrap_or_default()).join("go"));
    let kubernetes = go_path.join("src/k8s.io/kubernetes");

    match builder {
        Builder::Bazel => kubernetes.join("bazel-bin/cmd/kubeadm/linux_amd64_pure_stripped"),
        Builder::Docker => kubernetes.join("_output/dockerized/bin/linux/amd64"),
        Builder::Local => kubernetes.join("_output/local/bin/linux/amd64"),
    }
}

fn binary_name(prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_kubeadm"),
        _ => "kubeadm".to_owned(),
    }
}

/// Copies `<build output>/kubeadm` into the bin folder and records the override that
/// points ansible at it. Returns the binary path as seen from the machines.
pub fn import_kubeadm(
    config: &PlaygroundConfig,
    build_output: &Path,
    prefix: Option<&str>,
) -> Result<String> {
    let source = build_output.join("kubeadm");
    if !source.is_file() {
        exit!(
            format!("kubeadm binary not found in {}", build_output.display()),
            "Could not import kubeadm from {}",
            source.display()
        );
    }

    let name = binary_name(prefix);
    let bin = config.bin_folder();
    fs::create_dir_all(&bin)?;
    let target = bin.join(&name);
    fs::copy(&source, &target)?;
    info!("copied {} to {}", source.display(), target.display());

    let guest_binary = format!("{GUEST_BIN_FOLDER}/{name}");
    let mut kubeadm = Mapping::new();
    kubeadm.insert(Value::from("binary"), Value::from(guest_binary.as_str()));
    let mut vars = Mapping::new();
    vars.insert(Value::from("kubeadm"), Value::Mapping(kubeadm));

    let tmp = config.tmp_folder();
    fs::create_dir_all(&tmp)?;
    let override_file = tmp.join(EXTRA_VARS_OVERRIDE_FILE);
    fs::write(&override_file, serde_yaml::to_string(&vars)?)?;
    info!("extra vars override written to {}", override_file.display());

    Ok(guest_binary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env<'a>(vars: &'a HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |k| vars.get(k).map(|v| v.to_string())
    }

    #[test]
    fn go_path_precedence() {
        let mut vars = HashMap::from([("HOME", "/home/dev")]);
        assert_eq!(
            build_output_path(Builder::Local, env(&vars)),
            PathBuf::from("/home/dev/go/src/k8s.io/kubernetes/_output/local/bin/linux/amd64")
        );

        vars.insert("GOPATH", "/opt/go");
        assert_eq!(
            build_output_path(Builder::Docker, env(&vars)),
            PathBuf::from("/opt/go/src/k8s.io/kubernetes/_output/dockerized/bin/linux/amd64")
        );

        vars.insert("KUBEADM_BUILD_ROOT", "/build");
        assert_eq!(
            build_output_path(Builder::Bazel, env(&vars)),
            PathBuf::from(
                "/build/src/k8s.io/kubernetes/bazel-bin/cmd/kubeadm/linux_amd64_pure_stripped"
            )
        );
    }

    #[test]
    fn import_copies_binary_and_writes_override() {
        let build = tempfile::tempdir().unwrap();
        fs::write(build.path().join("kubeadm"), b"\x7fELF").unwrap();

        let root = tempfile::tempdir().unwrap();
        let config = PlaygroundConfig {
            root: root.path().to_owned(),
            ..Default::default()
        };

        let binary = import_kubeadm(&config, build.path(), Some("pr123")).unwrap();
        assert_eq!(binary, "/vagrant/bin/pr123_kubeadm");
        assert_eq!(
            fs::read(root.path().join("bin/pr123_kubeadm")).unwrap(),
            b"\x7fELF"
        );

        let written: Value = serde_yaml::from_str(
            &fs::read_to_string(root.path().join("tmp").join(EXTRA_VARS_OVERRIDE_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(
            written.get("kubeadm").unwrap().get("binary").unwrap(),
            "/vagrant/bin/pr123_kubeadm"
        );

        let binary = import_kubeadm(&config, build.path(), None).unwrap();
        assert_eq!(binary, "/vagrant/bin/kubeadm");
    }

    #[test]
    fn import_fails_without_build() {
        let build = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let config = PlaygroundConfig {
            root: root.path().to_owned(),
            ..Default::default()
        };
        assert!(import_kubeadm(&config, build.path(), None).is_err());
        assert!(!root.path().join("tmp").join(EXTRA_VARS_OVERRIDE_FILE).exists());
    }
}
