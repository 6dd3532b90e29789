//! Accident Replay
//!
//! Feeds recorded detector output through the accident engine:
//! - Layered configuration (defaults, TOML file, environment)
//! - Whole-clip or per-frame analysis
//! - JSON-lines reports on stdout, emergencies routed through the alert manager

pub mod input;

use std::path::{Path, PathBuf};

use accident_engine::{AccidentEngine, ClipFrame, EngineConfig, FrameReport};
use alerting::{AccidentAlert, AlertConfig, AlertManager};
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::input::{ClipInput, ClipKind};

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "ACCIDENT";

/// Replay configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub engine: EngineConfig,
    pub alerts: AlertConfig,
}

/// Initialize logging on stderr; stdout carries the reports
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

/// Defaults, then the optional TOML file, then `ACCIDENT__*` variables
pub fn load_config(path: Option<&Path>) -> Result<ReplayConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&ReplayConfig::default()).context("encoding defaults")?);
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
    }
    let config: ReplayConfig = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("building configuration")?
        .try_deserialize()
        .context("deserializing configuration")?;

    config.engine.validate().context("engine configuration")?;
    config.alerts.validate().context("alert configuration")?;
    Ok(config)
}

/// Replay recorded detector output through the accident engine
#[derive(Parser, Debug, Clone, PartialEq, Default)]
#[command(name = "accident-replay", author, version, about, long_about = None)]
pub struct Args {
    /// Clip file (JSON) with per-frame detections
    #[arg(value_name = "CLIP")]
    pub clip: PathBuf,

    /// TOML configuration file layered over the defaults
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report every frame instead of the sampled whole-clip analysis
    #[arg(long = "frames")]
    pub per_frame: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load, analyse and report one clip
pub async fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut engine = AccidentEngine::new(config.engine.clone()).context("creating engine")?;
    let mut alerts = AlertManager::new(config.alerts.clone()).context("creating alert manager")?;

    let clip = ClipInput::load(&args.clip).await?;
    let base_dir = args.clip.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let source = clip.source.clone();
    let kind = clip.kind;
    let frames = clip.decode(&base_dir).await?;
    info!(%source, ?kind, frames = frames.len(), per_frame = args.per_frame, "clip loaded");

    if args.per_frame {
        replay_frames(&mut engine, &mut alerts, &source, kind, frames)?;
        return Ok(());
    }

    let summary = match kind {
        ClipKind::Image => {
            let Some(first) = frames.into_iter().next() else {
                bail!("clip {source} has no frames");
            };
            let index = first.index;
            engine.analyze_image_with(&first.frame, first.detections, |report| {
                print_line(&json!({ "frame": index, "report": report }));
                if report.emergency {
                    route_alert(&mut alerts, &source, index, report);
                }
            })
        }
        ClipKind::Video => {
            let mut emergencies = Vec::new();
            let summary = engine.analyze_video_with(frames, |index, report| {
                print_line(&json!({ "frame": index, "report": report }));
                if report.emergency {
                    emergencies.push((index, report.clone()));
                }
            });
            for (index, report) in emergencies {
                route_alert(&mut alerts, &source, index, &report);
            }
            summary
        }
    };

    print_line(&json!({ "source": source, "summary": summary }));
    Ok(())
}

/// Feed every frame in order, reporting each one
fn replay_frames(
    engine: &mut AccidentEngine,
    alerts: &mut AlertManager,
    source: &str,
    kind: ClipKind,
    frames: Vec<ClipFrame>,
) -> Result<()> {
    engine.reset();
    let cold_start = engine.config().clip.cold_start_frames;
    for clip_frame in frames {
        let is_static = kind == ClipKind::Image || clip_frame.index < cold_start;
        let report = engine.process(&clip_frame.frame, clip_frame.detections, is_static);
        print_line(&json!({ "frame": clip_frame.index, "report": report }));
        if report.emergency {
            route_alert(alerts, source, clip_frame.index, &report);
        }
    }
    Ok(())
}

fn route_alert(alerts: &mut AlertManager, source: &str, index: u64, report: &FrameReport) {
    let Some(alert) = AccidentAlert::from_report(source, index, report) else {
        return;
    };
    if alerts.dispatch(&alert) {
        warn!(message = %alert.message(), "EMERGENCY");
        print_line(&json!({ "alert": alert }));
    }
}

fn print_line(value: &serde_json::Value) {
    println!("{value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("accident-replay").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["clip.json", "--frames", "-c", "engine.toml"]).unwrap();
        assert_eq!(parsed.clip, PathBuf::from("clip.json"));
        assert_eq!(parsed.config, Some(PathBuf::from("engine.toml")));
        assert!(parsed.per_frame);
        assert!(!parsed.verbose);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
        assert!(args(&["a.json", "--config"]).is_err());
        assert!(args(&["a.json", "--fast"]).is_err());
    }

    #[test]
    fn test_default_config_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config.engine.confirmation_threshold, 5);
        assert_eq!(config.alerts, AlertConfig::default());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("accident-replay-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[engine]\nconfirmation_threshold = 7\n\n[engine.clip]\nframe_stride = 5\n\n[alerts]\nmax_alerts_per_hour = 3\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.engine.confirmation_threshold, 7);
        assert_eq!(config.engine.clip.frame_stride, 5);
        assert_eq!(config.engine.clip.cold_start_frames, 30);
        assert_eq!(config.alerts.max_alerts_per_hour, 3);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let path = std::env::temp_dir().join(format!("accident-replay-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[engine]\nstatic_collision_iou = 3.0\n").unwrap();
        let result = load_config(Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_image_clip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("accident-replay-clip-{}.json", std::process::id()));
        let clip = json!({
            "source": "cam-9",
            "width": 640,
            "height": 480,
            "kind": "image",
            "frames": [{"index": 1, "detections": [
                {"bbox": [400, 252, 616, 432], "class_id": 5, "confidence": 0.9}
            ]}]
        });
        tokio::fs::write(&path, clip.to_string()).await.unwrap();

        let parsed = Args {
            clip: path.clone(),
            ..Default::default()
        };
        let result = run(&parsed).await;
        tokio::fs::remove_file(&path).await.ok();
        assert!(result.is_ok());
    }
}
