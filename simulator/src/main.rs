// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SATS Vault Simulator
//!
//! Entry point for the `sats-sim` binary. Parses CLI arguments, initializes
//! logging, and dispatches to one of four subcommands:
//!
//! - `simulate` — replay a scenario file against a fresh in-memory vault
//! - `preview`  — run one conversion against an arbitrary pool state
//! - `inspect`  — print the effective vault config and its genesis rate
//! - `version`  — print build version information

mod cli;
mod logging;
mod scenario;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;

use sats_protocol::math::conversion::pow10;
use sats_protocol::{ConversionEngine, PoolState, Rounding, VaultConfig};

use cli::{Commands, OutputFormat, PreviewOp, SatsSimCli};
use scenario::Scenario;

fn main() -> Result<()> {
    let cli = SatsSimCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Preview(args) => preview(args),
        Commands::Inspect(args) => inspect(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Loads the config file if one was given, otherwise the defaults.
fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    match path {
        Some(path) => VaultConfig::from_json_file(path)
            .with_context(|| format!("failed to load vault config: {}", path.display())),
        None => Ok(VaultConfig::default()),
    }
}

/// Replays a scenario and prints its report. Fails if any step disagreed
/// with its expectation.
fn simulate(args: cli::SimulateArgs) -> Result<()> {
    let scenario = Scenario::from_json_file(&args.scenario)?;
    let config = load_config(args.config.as_deref())?;
    let report = scenario.run(config)?;

    match args.output {
        OutputFormat::Pretty => println!("{report}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
    }

    if report.mismatches > 0 {
        bail!(
            "{} of {} step(s) did not match their expectation",
            report.mismatches,
            report.steps.len()
        );
    }
    Ok(())
}

/// Runs a single conversion with the rounding the named operation uses.
fn preview(args: cli::PreviewArgs) -> Result<()> {
    let engine = ConversionEngine::new(args.offset).context("unsupported decimals offset")?;
    let state = PoolState::new(args.tracked_assets, args.total_shares);

    let (result, unit, rounding) = match args.op {
        PreviewOp::Deposit => (
            engine.convert_to_shares(args.amount, &state, Rounding::Floor),
            "shares minted",
            Rounding::Floor,
        ),
        PreviewOp::Mint => (
            engine.convert_to_assets(args.amount, &state, Rounding::Ceiling),
            "assets paid",
            Rounding::Ceiling,
        ),
        PreviewOp::Withdraw => (
            engine.convert_to_shares(args.amount, &state, Rounding::Ceiling),
            "shares burned",
            Rounding::Ceiling,
        ),
        PreviewOp::Redeem => (
            engine.convert_to_assets(args.amount, &state, Rounding::Floor),
            "assets received",
            Rounding::Floor,
        ),
    };
    let value = result.context("conversion out of range")?;

    tracing::debug!(op = ?args.op, amount = %args.amount, %rounding, "preview");
    println!("{value} {unit} (rounding {rounding})");
    Ok(())
}

/// Prints the effective config, the genesis rate and the genesis price.
fn inspect(args: cli::InspectArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine =
        ConversionEngine::new(config.decimals_offset).context("unsupported decimals offset")?;
    let genesis = PoolState::empty();
    let one_share = pow10(u32::from(config.share_decimals())).context("unsupported decimals")?;
    let price = engine
        .convert_to_assets(one_share, &genesis, Rounding::Floor)
        .context("price out of range")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("failed to serialize config")?
    );
    println!("share decimals   {}", config.share_decimals());
    println!("shares per asset {}", engine.virtual_shares());
    println!("price per share  {price}");
    Ok(())
}

/// Prints version information.
fn print_version() {
    println!("sats-sim {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
