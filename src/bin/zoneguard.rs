//! zoneguard - warehouse zone monitor
//!
//! Runs the frame loop against the configured source and reads editor commands from
//! stdin, one per line (`e`, `g`, `r`, `v`, `n`, `del`, `c`, `h`, `q`, `down X Y`,
//! `move X Y`, `up`).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use zoneguard::{
    run_monitor, Command, LogSink, MonitorConfig, ScriptedDetector, StopReason, SubjectDetector,
    WandererDetector,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON config file (falls back to ZONEGUARD_CONFIG).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Frame source URL, overriding the config.
    #[arg(long, value_name = "URL")]
    source: Option<String>,
    /// Configured device to monitor; requires --passcode.
    #[arg(long, requires = "passcode")]
    device: Option<String>,
    #[arg(long, env = "ZONEGUARD_DEVICE_PASSCODE", hide_env_values = true)]
    passcode: Option<String>,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
    /// JSON-lines detection script, one array of detections per frame.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Seed for the synthetic walkers.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from(path)?,
        None => MonitorConfig::load()?,
    };
    if let Some(device) = &args.device {
        let passcode = args.passcode.as_deref().unwrap_or_default();
        let url = config
            .devices
            .verify(device, passcode)
            .ok_or_else(|| anyhow!("device {} rejected: unknown id or wrong passcode", device))?;
        config.source.url = url.to_string();
    }
    if let Some(source) = args.source {
        config.source.url = source;
    }
    if args.frames.is_some() {
        config.source.max_frames = args.frames;
    }

    let detector: Box<dyn SubjectDetector> = match &args.script {
        Some(path) => Box::new(
            ScriptedDetector::from_path(path)
                .with_context(|| format!("loading detection script {}", path.display()))?,
        ),
        None => Box::new(WandererDetector::new(&config.identities(), args.seed)),
    };

    let (tx, rx) = mpsc::channel();
    let quit_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = quit_tx.send(Command::Quit);
    })
    .map_err(|e| anyhow!("failed to install Ctrl-C handler: {}", e))?;
    spawn_stdin_reader(tx)?;

    log::info!(
        "zoneguard starting: source={} identities={}",
        config.source.url,
        config.access_levels.len()
    );
    let summary = run_monitor(&config, detector, Box::new(LogSink), rx)?;

    let stats = &summary.stats;
    log::info!(
        "processed {} frames ({} without detections): {} subjects annotated, {} veiled, {} alerts",
        stats.frames_processed,
        stats.frames_skipped,
        stats.subjects_annotated,
        stats.subjects_veiled,
        stats.alerts_raised
    );
    match summary.stop_reason {
        StopReason::Quit => log::info!("stopped by operator"),
        StopReason::CaptureFailure(reason) => log::info!("capture ended: {}", reason),
    }
    Ok(())
}

fn spawn_stdin_reader(tx: Sender<Command>) -> Result<()> {
    std::thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("ignoring input {:?}: {}", line.trim(), e),
                }
            }
        })?;
    Ok(())
}
