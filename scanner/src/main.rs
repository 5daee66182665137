use anyhow::Context;
use clap::Parser;
use generator::profile::{write_capture, CaptureKind, SynthConfig};
use report::write_report;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::ScanConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Scan radio captures for interference")]
struct Args {
    /// WAV audio or raw interleaved cf32 captures
    paths: Vec<PathBuf>,
    /// Load a scan config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Sample rate of raw captures (defaults to 2048000)
    #[arg(long)]
    sample_rate: Option<u32>,
    #[arg(long)]
    center_frequency: Option<f64>,
    /// Write a synthetic capture here and scan it with the rest
    #[arg(long)]
    synthesize: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = CaptureKind::Audio)]
    kind: CaptureKind,
    #[arg(long, default_value_t = 5_000.0)]
    tone_hz: f32,
    /// Seconds of synthetic signal
    #[arg(long, default_value_t = 2.0)]
    duration: f32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the JSON scan report here
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let flags = ScanConfig::from_args(args.sample_rate, args.center_frequency, args.report);
    let config = if let Some(path) = args.workflow {
        ScanConfig::load(path)?.with_overrides(flags)
    } else {
        flags
    };

    let mut paths = args.paths;
    if let Some(path) = args.synthesize {
        let defaults = SynthConfig::for_kind(args.kind);
        let synth = SynthConfig {
            sample_rate: match args.kind {
                CaptureKind::Iq => config.sample_rate.unwrap_or(defaults.sample_rate),
                CaptureKind::Audio => defaults.sample_rate,
            },
            tone_hz: args.tone_hz,
            duration: args.duration,
            seed: args.seed,
            ..defaults
        };
        let written = write_capture(&path, &synth)?;
        println!(
            "Synthesized {:?} capture -> {} ({} samples at {} Hz)",
            synth.kind,
            path.display(),
            written,
            synth.sample_rate
        );
        paths.push(path);
    }
    if paths.is_empty() {
        anyhow::bail!("nothing to scan: pass capture paths or --synthesize");
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;
    let runner = Runner::new(config.clone());
    let report = runtime.block_on(runner.execute(&paths))?;

    for line in report.summary_lines() {
        println!("{}", line);
    }
    if let Some(path) = &config.report {
        write_report(&report, path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
