use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exit;

/// Folder layout of a playground checkout, read from `playground.toml`.
///
/// Relative folders are resolved against `root`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Folder holding the Vagrantfile, vagrant commands run from here
    pub root: PathBuf,
    /// Glob (or folder) with the cluster api specification
    pub spec: String,
    pub tmp: PathBuf,
    pub bin: PathBuf,
    pub ansible: PathBuf,
    pub playbook: String,
    /// Name of the provider creating the machines
    pub provider: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            spec: "spec/*.yml".to_owned(),
            tmp: PathBuf::from("tmp"),
            bin: PathBuf::from("bin"),
            ansible: PathBuf::from("hack/ansible"),
            playbook: "cluster.yml".to_owned(),
            provider: "vagrant".to_owned(),
        }
    }
}

impl PlaygroundConfig {
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_owned()
        } else {
            self.root.join(p)
        }
    }

    pub fn spec_pattern(&self) -> String {
        self.resolve(Path::new(&self.spec)).to_string_lossy().into_owned()
    }

    pub fn tmp_folder(&self) -> PathBuf {
        self.resolve(&self.tmp)
    }

    pub fn bin_folder(&self) -> PathBuf {
        self.resolve(&self.bin)
    }

    pub fn ansible_folder(&self) -> PathBuf {
        self.resolve(&self.ansible)
    }
}

/// Anchors a relative path to the current directory, for commands run elsewhere.
pub fn absolute(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_owned());
    }
    Ok(std::env::current_dir()?.join(p))
}

/// Reads the config file, falling back to defaults when it does not exist.
pub fn parse_config(file: &str) -> Result<PlaygroundConfig> {
    if !Path::new(file).exists() {
        info!("no config file {file}, using defaults");
        return Ok(PlaygroundConfig::default());
    }

    let config = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(err) => exit!(err, "Could not read config file {}", file),
    };

    let config: Result<PlaygroundConfig, toml::de::Error> = toml::from_str(config.as_str());
    let config = match config {
        Ok(c) => c,
        Err(err) => exit!(err, "Could not parse config file {}", file),
    };

    info!("config file parsed");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("playground.toml");
        let c = parse_config(file.to_str().unwrap()).unwrap();
        assert_eq!(c.spec_pattern(), "./spec/*.yml");
        assert_eq!(c.tmp_folder(), PathBuf::from("./tmp"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("playground.toml");
        std::fs::write(&file, "root = \"/srv/playground\"\ntmp = \"/var/tmp/pg\"\n").unwrap();

        let c = parse_config(file.to_str().unwrap()).unwrap();
        assert_eq!(c.tmp_folder(), PathBuf::from("/var/tmp/pg"));
        assert_eq!(c.bin_folder(), PathBuf::from("/srv/playground/bin"));
        assert_eq!(c.ansible_folder(), PathBuf::from("/srv/playground/hack/ansible"));
        assert_eq!(c.playbook, "cluster.yml");
        assert_eq!(c.provider, "vagrant");
    }

    #[test]
    fn relative_paths_are_anchored() {
        let cwd = std::env::current_dir().unwrap();
        let tmp = absolute(&PlaygroundConfig::default().tmp_folder()).unwrap();
        assert!(tmp.is_absolute());
        assert!(tmp.starts_with(&cwd));
        assert!(tmp.ends_with("tmp"));
        assert_eq!(absolute(Path::new("/var/tmp")).unwrap(), PathBuf::from("/var/tmp"));
    }

    #[test]
    fn invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("playground.toml");
        std::fs::write(&file, "root = [").unwrap();
        assert!(parse_config(file.to_str().unwrap()).is_err());
    }
}
