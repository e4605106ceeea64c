//! Analyze a handful of synthetic captures and print the report.
//!
//! Run with `RUST_LOG=debug` to see per-file and fit diagnostics.

use std::f64::consts::{PI, TAU};

use anyhow::Context;
use jgrab_config::DeploymentConfig;
use jgrab_pipeline::{BatchRunner, FileAnalyzer, MemorySink};
use tracing_subscriber::EnvFilter;

fn sine_counts(amplitude: f64, third: f64) -> impl Iterator<Item = i64> {
    (0..128_u32).map(move |i| {
        let t = f64::from(i) / 3200.0;
        (amplitude * (TAU * 50.0 * t).sin() + third * (TAU * 150.0 * t + PI).sin()).round() as i64
    })
}

fn capture(voltage: f64, third: f64) -> String {
    let channels: [Vec<i64>; 5] = [
        vec![14_000; 128],
        sine_counts(450.0, 0.0).collect(),
        sine_counts(voltage, third).collect(),
        sine_counts(700.0, 0.0).collect(),
        sine_counts(voltage * 0.98, 0.0).collect(),
    ];
    let mut text = String::from("JGRAB\n");
    for channel in &channels {
        for v in channel {
            text.push_str(&format!("{v}\n"));
        }
        text.push_str("%%\n");
    }
    text
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let dir = tempfile::tempdir().context("creating capture directory")?;
    let mut paths = Vec::new();
    for (hour, third) in [(6, 0.0), (12, 400.0), (18, 900.0)] {
        let path = dir.path().join(format!("2024-01-15__{hour:02}_00-JGRAB.txt"));
        std::fs::write(&path, capture(13_356.0, third))
            .with_context(|| format!("writing {}", path.display()))?;
        paths.push(path);
    }
    paths.sort_by(|a, b| b.cmp(a));

    let config = DeploymentConfig::load_or_default(None).context("loading deployment")?;
    let analyzer = FileAnalyzer::new(&config)?;
    let report = BatchRunner::new(analyzer).with_threads(2)?.run(&paths);

    let mut sink = MemorySink::new();
    let Ok(()) = report.write_to(&mut sink);
    for line in sink.lines() {
        println!("{line}");
    }
    for failure in &report.failures {
        eprintln!("skipped {}: {}", failure.path.display(), failure.error);
    }
    Ok(())
}
