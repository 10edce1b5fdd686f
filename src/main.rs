/*!
 * Simulator - Main Entry Point
 *
 * Drives the scheduler and the allocation authority from a config document:
 * - schedule: run the scheduler for the configured rounds
 * - bank: run the scripted resource events with safety checks
 * - request / release: apply one manual operation to the initial state
 * - check / status: report safety and deadlock verdicts
 */

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use os_sim::{
    init_tracing, load_config, AllocationAuthority, Amount, BankerSimulation, Pid,
    SchedulerSimulation, SimResult,
};

#[derive(Parser)]
#[command(name = "simulator", version, about = "OS resource-control simulator")]
struct Cli {
    /// Log scheduling and allocation decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler for the configured number of rounds
    Schedule {
        config: PathBuf,
        /// Override the configured round count
        #[arg(long)]
        rounds: Option<u64>,
    },
    /// Run the Banker's simulation with its scripted events
    Bank { config: PathBuf },
    /// Request resources for one process, e.g. `request sim.toml 2 A=1`
    Request {
        config: PathBuf,
        pid: Pid,
        #[arg(value_parser = parse_amount, required = true)]
        amounts: Vec<(String, Amount)>,
    },
    /// Release resources held by one process
    Release {
        config: PathBuf,
        pid: Pid,
        #[arg(value_parser = parse_amount, required = true)]
        amounts: Vec<(String, Amount)>,
    },
    /// Report the safety verdict and any deadlocked processes
    Check { config: PathBuf },
    /// Print the full allocation state as JSON
    Status { config: PathBuf },
}

/// Parse `TYPE=N`
fn parse_amount(arg: &str) -> std::result::Result<(String, Amount), String> {
    let (name, amount) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=N, got '{arg}'"))?;
    let amount = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in '{arg}': {e}"))?;
    Ok((name.trim().to_string(), amount))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn authority_from(config: &Path) -> SimResult<AllocationAuthority> {
    load_config(config)?.build_authority()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    match cli.command {
        Command::Schedule { config, rounds } => {
            let mut config = load_config(&config)?;
            if let Some(rounds) = rounds {
                config.simulation.total_rounds = rounds;
            }
            let mut simulation = SchedulerSimulation::from_config(&config)?;
            let status = simulation.run();
            print_json(&status)?;
        }
        Command::Bank { config } => {
            let config = load_config(&config)?;
            let mut simulation = BankerSimulation::from_config(&config)?;
            let snapshot = simulation.run();
            print_json(&simulation.rounds())?;
            println!("{}", snapshot.to_json()?);
        }
        Command::Request {
            config,
            pid,
            amounts,
        } => {
            let mut authority = authority_from(&config)?;
            let map: BTreeMap<String, Amount> = amounts.into_iter().collect();
            let request = authority.types().vector_from_map(&map, "request")?;
            authority.request_resources(pid, &request)?;
            info!(pid, "request granted");
            println!("{}", authority.snapshot().to_json()?);
        }
        Command::Release {
            config,
            pid,
            amounts,
        } => {
            let mut authority = authority_from(&config)?;
            let map: BTreeMap<String, Amount> = amounts.into_iter().collect();
            let release = authority.types().vector_from_map(&map, "release")?;
            authority.release_resources(pid, &release)?;
            info!(pid, "release applied");
            println!("{}", authority.snapshot().to_json()?);
        }
        Command::Check { config } => {
            let mut authority = authority_from(&config)?;
            let report = authority.safety_check();
            let deadlocked = authority.detect_deadlock();
            print_json(&serde_json::json!({
                "safe": report.safe,
                "sequence": report.sequence,
                "deadlocked": deadlocked,
            }))?;
        }
        Command::Status { config } => {
            let authority = authority_from(&config)?;
            println!("{}", authority.snapshot().to_json()?);
        }
    }
    Ok(())
}
