use std::{
    collections::HashMap,
    ffi::OsStr,
    path::Path,
    process::Stdio,
    time::{Duration, Instant},
};

use anyhow::Result;
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::process::Command;

use crate::exit;

lazy_static::lazy_static! {
    static ref DOTS_STYLE: ProgressStyle = ProgressStyle::with_template("{spinner} {msg} {elapsed_precise}").unwrap().tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pub static ref GREEN_TICK: StyledObject<&'static str> = style("✔").green();
    static ref RED_CROSS: StyledObject<&'static str> = style("✗").red();
}

pub fn progress(msg: &str) -> ProgressBar {
    let w = ProgressBar::new_spinner();
    w.set_style(DOTS_STYLE.clone());
    w.enable_steady_tick(Duration::from_millis(80));
    w.set_message(msg.to_owned());
    w
}

/// Runs `cmd` in `dir`, behind a spinner unless `verbose`.
///
/// `msgs` are the ongoing, failure and success messages.
pub async fn command<K, V>(
    cmd: &str,
    args: &[&str],
    verbose: bool,
    msgs: [&str; 3],
    dir: &Path,
    env: HashMap<K, V>,
) -> Result<()>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    tracing::info!("{cmd} {args:?}");
    let mut cmd = Command::new(cmd);
    let mut _cmd = cmd.current_dir(dir).args(args);

    env.iter().for_each(|(k, v)| {
        _cmd.env(k, v);
    });

    let mut pb = None;
    if !verbose {
        _cmd = _cmd.stdout(Stdio::piped());
        pb = Some(progress(msgs[0]));
    }

    let start_time = Instant::now();
    let cmd_spawn = _cmd.spawn()?;
    let output = cmd_spawn.wait_with_output().await?;
    let dur = start_time.elapsed();
    if !output.status.success() {
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        exit!(String::from_utf8(output.stdout)?, "{} {}", RED_CROSS.to_string(), msgs[1]);
    }

    finish_progress(msgs[2], &dir.display().to_string(), dur, pb);
    Ok(())
}

/// Runs `cmd` in `dir` and returns what it printed on stdout.
pub async fn output(cmd: &str, args: &[&str], dir: &Path) -> Result<String> {
    tracing::info!("{cmd} {args:?}");
    let output = Command::new(cmd).current_dir(dir).args(args).output().await?;
    if !output.status.success() {
        exit!(
            String::from_utf8_lossy(&output.stderr).into_owned(),
            "Error executing `{} {}`",
            cmd,
            args.first().copied().unwrap_or_default()
        );
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Runs `cmd` attached to the terminal, for interactive sessions.
pub async fn interactive(cmd: &str, args: &[&str], dir: &Path) -> Result<()> {
    tracing::info!("{cmd} {args:?}");
    let status = Command::new(cmd).current_dir(dir).args(args).status().await?;
    if !status.success() {
        exit!(format!("{cmd} exited with {status}"), "Error executing `{} {}`", cmd, args.join(" "));
    }
    Ok(())
}

fn elapsed_time_str(dur: &Duration) -> String {
    let seconds = dur.as_secs() % 60;
    let minutes = (dur.as_secs() / 60) % 60;
    let hours = (dur.as_secs() / 60) / 60;
    format!("{:0>2}:{:0>2}:{:0>2}", hours, minutes, seconds)
}

pub fn finish_progress(
    status_message: &str,
    context: &str,
    dur: Duration,
    pb: Option<ProgressBar>,
) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!(
        "{} {} ({}) took, {}",
        GREEN_TICK.to_string(),
        status_message,
        context,
        elapsed_time_str(&dur)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(elapsed_time_str(&Duration::from_secs(0)), "00:00:00");
        assert_eq!(elapsed_time_str(&Duration::from_secs(3723)), "01:02:03");
    }

    #[tokio::test]
    async fn output_captures_stdout() {
        let out = output("echo", &["hello"], Path::new(".")).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn failing_command_is_an_error() {
        let res = command(
            "false",
            &[],
            true,
            ["Running", "Could not run", "Ran"],
            Path::new("."),
            HashMap::<&str, &str>::new(),
        )
        .await;
        assert!(res.is_err());
    }
}
