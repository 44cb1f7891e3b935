use anyhow::Result;
use common::{
    command::GREEN_TICK,
    exit,
    import::{build_output_path, import_kubeadm},
    kubeadm::Builder,
    validators::Enumeration,
};

use crate::args::{Cli, ImportArgs};

use super::load_config;

fn parse_builder(s: &str) -> Result<Builder> {
    match Builder::parse(s) {
        Some(b) => Ok(b),
        None => exit!(
            format!(
                "invalid {} '{}'. Valid values are {}",
                Builder::KIND,
                s,
                Builder::VALUES.join(", ")
            ),
            "Unknown builder {}",
            s
        ),
    }
}

pub fn import(args: &ImportArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let builder = parse_builder(&args.builder)?;
    let build_output = build_output_path(builder, |k| std::env::var(k).ok());
    let binary = import_kubeadm(&config, &build_output, args.prefix.as_deref())?;
    println!(
        "{} kubeadm from the {} build imported as {}",
        GREEN_TICK.to_string(),
        builder,
        binary
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders() {
        assert_eq!(parse_builder("bazel").unwrap(), Builder::Bazel);
        assert_eq!(parse_builder("local").unwrap(), Builder::Local);
        let err = parse_builder("make").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid builder type 'make'. Valid values are bazel, docker, local"
        );
    }
}
