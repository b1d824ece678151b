//! # CLI Interface
//!
//! Defines the command-line argument structure for `sats-sim` using
//! `clap` derive. Supports four subcommands: `simulate`, `preview`,
//! `inspect`, and `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// SATS vault simulator.
///
/// Replays scripted scenarios against an in-memory vault, previews single
/// conversions against arbitrary pool states, and inspects vault parameters.
#[derive(Parser, Debug)]
#[command(
    name = "sats-sim",
    about = "SATS vault simulator",
    version,
    propagate_version = true
)]
pub struct SatsSimCli {
    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "SATS_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, global = true, env = "SATS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the simulator binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scenario file against a fresh vault and report the outcome.
    Simulate(SimulateArgs),
    /// Run one conversion against a given pool state.
    Preview(PreviewArgs),
    /// Print the effective vault configuration and its genesis rate.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, human-readable text.
    Pretty,
    /// A single JSON document on stdout.
    Json,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file (JSON).
    #[arg(long, short = 's')]
    pub scenario: PathBuf,

    /// Path to a vault config file (JSON). A `config` block inside the
    /// scenario takes precedence.
    #[arg(long, short = 'c', env = "SATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// How to render the report.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

/// Which conversion `preview` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PreviewOp {
    /// Assets in, shares out (floor).
    Deposit,
    /// Shares out, assets in (ceiling).
    Mint,
    /// Assets out, shares in (ceiling).
    Withdraw,
    /// Shares in, assets out (floor).
    Redeem,
}

/// Arguments for the `preview` subcommand.
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Tracked assets of the pool.
    #[arg(long, default_value_t = 0)]
    pub tracked_assets: u128,

    /// Shares issued by the pool.
    #[arg(long, default_value_t = 0)]
    pub total_shares: u128,

    /// Decimals offset of the vault.
    #[arg(long, default_value_t = sats_protocol::config::DEFAULT_DECIMALS_OFFSET)]
    pub offset: u8,

    /// The operation to preview.
    #[arg(value_enum)]
    pub op: PreviewOp,

    /// Assets for deposit/withdraw, shares for mint/redeem.
    pub amount: u128,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to a vault config file (JSON). Defaults apply when omitted.
    #[arg(long, short = 'c', env = "SATS_CONFIG")]
    pub config: Option<PathBuf>,
}
