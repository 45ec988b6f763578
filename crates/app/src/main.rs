use std::path::{Path, PathBuf};

use audio_selector_core::meter::{BarGraph, Scale, Thresholds};
use audio_selector_core::stream::sim::{drive, Sink, Source};
use audio_selector_core::{AppConfig, AudioSelector, KeyScript};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> audio_selector_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            ticks,
            keys,
            hold,
            output,
        } => run_simulate(
            config.as_deref(),
            ticks,
            keys.as_deref(),
            hold,
            output.as_deref(),
        ),
        Commands::Bars { level, config } => run_bars(level, config.as_deref()),
        Commands::InitConfig { output } => run_init_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> audio_selector_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_simulate(
    config: Option<&Path>,
    ticks: u64,
    keys: Option<&str>,
    hold: Option<u64>,
    output: Option<&Path>,
) -> audio_selector_core::Result<()> {
    let config = load_config(config)?;
    let mut selector = AudioSelector::new(&config)?;

    if let Some(keys) = keys {
        let script = KeyScript::parse(keys)?;
        let hold = hold.unwrap_or(config.keys.hold);
        selector.load_script(&script, hold)?;
        if selector.script_end() >= ticks {
            tracing::warn!(
                script_end = selector.script_end(),
                ticks,
                "key script runs past the end of the simulation"
            );
        }
    }

    let report = selector.run(ticks);
    match output {
        Some(path) => {
            report.write(path)?;
            tracing::info!(?path, "report written");
        }
        None => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn run_bars(level: i32, config: Option<&Path>) -> audio_selector_core::Result<()> {
    let config = load_config(config)?;
    let meter = &config.meter;
    let scale = Scale::new(meter.sample_width, meter.output_width)?;
    let thresholds = Thresholds::new(&meter.thresholds, scale)?;
    let segments = thresholds.len();

    let mut bars = BarGraph::new(thresholds);
    let out = drive(&mut bars, Source::singles([level]), Sink::new(), 4 * segments as u64 + 8);
    let values = out.values();

    let frames: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(index, &value)| meter.colors.frame(meter.led_offset.wrapping_add(index as u8), value))
        .collect();

    tracing::debug!(level, segments, "bar graph evaluated");
    let summary = serde_json::json!({
        "level": level,
        "segments": values,
        "leds": frames,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_init_config(output: &PathBuf) -> audio_selector_core::Result<()> {
    AppConfig::default().save(output)?;
    tracing::info!(?output, "default configuration written");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-channel audio selector simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the complete selector for a number of clock ticks.
    Simulate {
        /// JSON configuration file. Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of clock ticks to simulate.
        #[arg(short, long, default_value_t = 200_000)]
        ticks: u64,
        /// Key gestures to play, e.g. "sw, down, down, sw".
        #[arg(short, long)]
        keys: Option<String>,
        /// Ticks each key snapshot is held for.
        #[arg(long)]
        hold: Option<u64>,
        /// Write the report here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the segment brightnesses the bar graph draws for one level.
    Bars {
        /// Rectified, averaged sample magnitude.
        #[arg(short, long, allow_hyphen_values = true)]
        level: i32,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to a file.
    InitConfig {
        #[arg(short, long)]
        output: PathBuf,
    },
}
