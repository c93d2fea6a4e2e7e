use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use chain::{run_fixture, FixtureFile, HarnessConfig};
use clap::Parser;
use containers::SealEngine;
use tracing::{error, info};
use transition::T8nTool;

#[derive(Parser, Debug)]
#[command(about = "Run a blockchain test fixture through a transition tool")]
struct Args {
    /// Harness configuration (YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transition tool executable, overrides the configured one.
    #[arg(short, long)]
    tool: Option<PathBuf>,

    /// Blockchain test fixture (JSON) holding a single test.
    #[arg(short, long)]
    fixture: PathBuf,

    /// Fork to run under instead of the fixture's network.
    #[arg(long)]
    fork: Option<String>,

    /// Seal engine for fixtures that do not name one.
    #[arg(long)]
    seal_engine: Option<SealEngine>,

    /// Seconds before a transition tool call is abandoned.
    #[arg(long)]
    timeout: Option<u64>,
}

fn load_config(args: &Args) -> Result<HarnessConfig> {
    let mut config = match (&args.config, &args.tool) {
        (Some(path), _) => HarnessConfig::load_from_file(path)?,
        (None, Some(tool)) => HarnessConfig::new(tool),
        (None, None) => bail!("either --config or --tool is required"),
    };
    if let Some(tool) = &args.tool {
        config.tool = tool.clone();
    }
    if let Some(seal_engine) = args.seal_engine {
        config.seal_engine = seal_engine;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }
    Ok(config)
}

fn run(args: Args) -> Result<bool> {
    let config = load_config(&args)?;
    let (name, fixture) = FixtureFile::load_from_file(&args.fixture)?.single()?;
    let fork = config
        .fork(args.fork.as_deref().unwrap_or(&fixture.network))?
        .clone();

    info!(
        test = %name,
        fork = %fork,
        tool = %config.tool.display(),
        "Running fixture"
    );

    let tool = T8nTool::new(&config.tool)
        .with_args(config.tool_args.iter().cloned())
        .with_timeout(config.timeout());
    let report = run_fixture(&name, &fixture, fork, config.seal_engine, tool)?;

    for block in &report.mismatches {
        for mismatch in &block.mismatches {
            println!("{name}: block {}: {mismatch}", block.index);
        }
    }
    if let Some((expected, actual)) = report.last_block_hash {
        println!("{name}: lastblockhash: expected {expected}, got {actual}");
    }
    println!(
        "{name}: {} ({} mined, {} skipped)",
        if report.passed() { "PASS" } else { "FAIL" },
        report.blocks_mined,
        report.blocks_skipped
    );
    Ok(report.passed())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Fixture run failed");
            ExitCode::from(2)
        }
    }
}
