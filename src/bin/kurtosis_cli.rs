use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use spectral_kurtosis::audio::load_wav;
use spectral_kurtosis::config::AppConfig;
use spectral_kurtosis::error::log_audio_error;
use spectral_kurtosis::plugin::spectral_kurtosis::IDENTIFIER;
use spectral_kurtosis::plugin::{InputDomain, OutputDescriptor, PluginDescriptor};
use spectral_kurtosis::{FrameResult, OfflineHost, PluginRegistry};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "kurtosis_cli",
    about = "Frame-by-frame spectral kurtosis of WAV files"
)]
struct Cli {
    /// JSON configuration file (framing + guard thresholds)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered plugins with their outputs
    Describe,
    /// Compute one feature value per frame of a mono WAV file
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = IDENTIFIER)]
        plugin: String,
        /// Block size in samples (default: --config framing, else the plugin's preference)
        #[arg(long)]
        block_size: Option<usize>,
        /// Step size in samples (default: --config framing, else the plugin's preference)
        #[arg(long)]
        step_size: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::try_load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    let registry = PluginRegistry::builtin(config.kurtosis.thresholds());

    match cli.command {
        Commands::Describe => run_describe(&registry),
        Commands::Analyze {
            input,
            plugin,
            block_size,
            step_size,
            output,
        } => {
            let framing = Framing {
                block_size,
                step_size,
                from_config: cli.config.is_some(),
            };
            run_analyze(&registry, &config, &input, &plugin, framing, output)
        }
    }
}

fn run_describe(registry: &PluginRegistry) -> Result<()> {
    let mut entries = Vec::with_capacity(registry.len());
    for identifier in registry.identifiers() {
        let plugin = registry
            .create(identifier, 44100.0)
            .ok_or_else(|| anyhow!("plugin {} vanished from registry", identifier))?;
        entries.push(PluginSummary {
            descriptor: plugin.descriptor(),
            input_domain: plugin.input_domain(),
            preferred_block_size: plugin.preferred_block_size(),
            preferred_step_size: plugin.preferred_step_size(),
            min_channel_count: plugin.min_channel_count(),
            max_channel_count: plugin.max_channel_count(),
            outputs: plugin.output_descriptors(),
        });
    }

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Where block/step sizes come from for one `analyze` run
struct Framing {
    block_size: Option<usize>,
    step_size: Option<usize>,
    from_config: bool,
}

fn run_analyze(
    registry: &PluginRegistry,
    config: &AppConfig,
    input: &Path,
    plugin_id: &str,
    framing: Framing,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let clip = load_wav(input)
        .inspect_err(|err| log_audio_error(err, "analyze"))
        .with_context(|| format!("loading {}", input.display()))?;
    let sample_rate = clip.sample_rate as f32;

    let mut plugin = registry
        .create(plugin_id, sample_rate)
        .ok_or_else(|| anyhow!("unknown plugin '{}'", plugin_id))?;

    // Explicit flags win, then an explicit config file, then the plugin
    let base = if framing.from_config {
        OfflineHost::from_config(sample_rate, &config.analysis)?
    } else {
        OfflineHost::for_plugin(plugin.as_ref(), sample_rate, &config.analysis)?
    };
    let block_size = framing.block_size.unwrap_or(base.block_size());
    let step_size = framing.step_size.unwrap_or(base.step_size());
    let host = OfflineHost::new(sample_rate, block_size, step_size)?;

    let frames = host
        .run(plugin.as_mut(), &clip.channels)
        .with_context(|| format!("analysing {}", input.display()))?;

    let report = AnalysisReport {
        plugin: plugin_id,
        input: input.display().to_string(),
        sample_rate: clip.sample_rate,
        block_size,
        step_size,
        frame_count: frames.len(),
        frames: frames.iter().map(FrameRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

#[derive(Serialize)]
struct PluginSummary {
    #[serde(flatten)]
    descriptor: PluginDescriptor,
    input_domain: InputDomain,
    preferred_block_size: usize,
    preferred_step_size: usize,
    min_channel_count: usize,
    max_channel_count: usize,
    outputs: Vec<OutputDescriptor>,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    plugin: &'a str,
    input: String,
    sample_rate: u32,
    block_size: usize,
    step_size: usize,
    frame_count: usize,
    frames: Vec<FrameRecord>,
}

#[derive(Serialize)]
struct FrameRecord {
    index: usize,
    time_secs: f64,
    value: f32,
}

impl From<&FrameResult> for FrameRecord {
    fn from(frame: &FrameResult) -> Self {
        Self {
            index: frame.index,
            time_secs: frame.timestamp.as_secs_f64(),
            value: frame.value,
        }
    }
}
