use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stochaug::{DynamicPipeline, DynamicPipelineConfig, ImageArray, PipelineConfig, StaticPipeline};

#[derive(Parser, Debug)]
#[command(name = "stochaug", version)]
struct Cli {
    /// Log pipeline decisions at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Augment with a fixed-order pipeline configured by a JSON object of step parameters.
    Static(RunArgs),
    /// Augment with one randomly chosen group of scripted steps.
    Dynamic(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Pipeline configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output image; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Seed for the random source. Drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Static(args) => cmd_static(args),
        Command::Dynamic(args) => cmd_dynamic(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read config '{}'", path.display()))
}

fn seed_of(args: &RunArgs) -> u64 {
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::debug!(seed, "random source");
    seed
}

fn cmd_static(args: RunArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::from_json_str(&read_config(&args.config)?)
        .with_context(|| format!("parse static config '{}'", args.config.display()))?;
    tracing::debug!(steps = ?config.enabled_steps(), "static pipeline");
    let input = ImageArray::open(&args.in_path)?;

    let mut rng = stochaug::seeded_rng(seed_of(&args));
    let out = StaticPipeline::new(config).run(&input, &mut rng)?;

    out.save(&args.out)?;
    let (h, w, c) = out.shape();
    println!("wrote {} ({w}x{h}, {c} channel(s))", args.out.display());
    Ok(())
}

fn cmd_dynamic(args: RunArgs) -> anyhow::Result<()> {
    let config = DynamicPipelineConfig::from_json_str(&read_config(&args.config)?)
        .with_context(|| format!("parse dynamic config '{}'", args.config.display()))?;
    let pipeline = DynamicPipeline::compile(&config)?;
    let input = ImageArray::open(&args.in_path)?;

    let mut rng = stochaug::seeded_rng(seed_of(&args));
    let out = pipeline.run(&input, &mut rng)?;

    out.save(&args.out)?;
    let (h, w, c) = out.shape();
    println!("wrote {} ({w}x{h}, {c} channel(s))", args.out.display());
    Ok(())
}
