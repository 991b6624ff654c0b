use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;
use ucd_tables::{
    artifact::{self, Artifact},
    derive::Generator,
    oracle::IcuOracle,
    ucd,
    validate::{Mode, ValidateConfig, Validator},
};

/// Derive compact Unicode property tables from the UCD and check them.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive the artifact from a UCD directory or UCD.zip.
    Generate {
        /// Extracted UCD directory or UCD.zip archive.
        #[arg(long)]
        ucd: PathBuf,
        /// Artifact to write.
        #[arg(long)]
        output: PathBuf,
    },
    /// Check an artifact against the ICU property data.
    Validate {
        #[arg(long)]
        artifact: PathBuf,
        /// first, sample or full.
        #[arg(long, env = "MODE", default_value = "first")]
        mode: String,
        /// Seed for the sample mode.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn generate(root: PathBuf, output: PathBuf) -> Result<()> {
    let source = ucd::open(&root)?;
    let mut generator = Generator::new(source)
        .with_context(|| format!("failed to load aliases from {}", root.display()))?;
    let entries = generator
        .run()
        .with_context(|| format!("failed to derive tables from {}", root.display()))?;
    artifact::write_file(&output, &entries)?;
    Ok(())
}

fn validate(path: PathBuf, mode: &str, seed: Option<u64>) -> Result<()> {
    let mode: Mode = mode.parse()?;
    let artifact =
        Artifact::read(&path).with_context(|| format!("failed to load {}", path.display()))?;
    let config = ValidateConfig { mode, seed };
    let report = Validator::new(IcuOracle, config)
        .validate(&artifact)
        .with_context(|| format!("{} failed validation in {mode} mode", path.display()))?;
    for skipped in &report.skipped {
        log::debug!("skipped {}: {}", skipped.query, skipped.reason);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Command::Generate { ucd, output } => generate(ucd, output),
        Command::Validate {
            artifact,
            mode,
            seed,
        } => validate(artifact, &mode, seed),
    }
}
