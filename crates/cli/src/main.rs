// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tradelog_cli::commands::{append, demo, dump, inspect, verify};
use tradelog_cli::exit_code;
use tradelog_persistence::{LogConfig, Rotation, SyncMode};
use tradelog_writer::telemetry;

#[derive(Parser)]
#[command(name = "tradelog")]
#[command(about = "Append-only, crash-safe trade event log", long_about = None)]
struct Cli {
    /// Print Prometheus metrics collected during the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LogArgs {
    /// Log file, or segment directory when rotating
    #[arg(long, short, default_value = "events.evlog")]
    path: PathBuf,

    /// never | hourly | daily
    #[arg(long, default_value_t = Rotation::Never)]
    rotation: Rotation,

    /// always | batched:<n>
    #[arg(long, default_value_t = SyncMode::Always)]
    sync: SyncMode,
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        LogConfig::new(args.path).with_rotation(args.rotation).with_sync(args.sync)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reference TRADE event through a full init / write / close cycle
    Demo {
        #[command(flatten)]
        log: LogArgs,
    },
    /// Append one event given as fields, or many from a JSON-lines file
    Append {
        #[command(flatten)]
        log: LogArgs,

        /// JSON-lines file of events (as printed by `dump --json`)
        #[arg(long, conflicts_with_all = ["event_type", "account_id", "strategy_id", "coin", "amount", "trace_id"])]
        json_file: Option<PathBuf>,

        /// TRADE | BALANCE-CHANGE | SETTLE-FEE, or 0 | 1 | 2
        #[arg(long, short = 't', required_unless_present = "json_file")]
        event_type: Option<String>,
        #[arg(long, required_unless_present = "json_file")]
        account_id: Option<u64>,
        #[arg(long, required_unless_present = "json_file")]
        strategy_id: Option<u64>,
        #[arg(long, required_unless_present = "json_file")]
        coin: Option<String>,
        /// Decimal string, stored verbatim
        #[arg(long, required_unless_present = "json_file", allow_hyphen_values = true)]
        amount: Option<String>,
        /// tradeId for trades, eventId otherwise
        #[arg(long, required_unless_present = "json_file")]
        trace_id: Option<String>,
    },
    /// Show per-segment status without modifying anything
    Inspect { path: PathBuf },
    /// Print every record in write order
    Dump {
        path: PathBuf,

        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Check checksums, sequence continuity and payload decoding
    Verify { path: PathBuf },
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Demo { log } => demo::run(log.into()),
        Commands::Append {
            log,
            json_file,
            event_type,
            account_id,
            strategy_id,
            coin,
            amount,
            trace_id,
        } => {
            let events = match json_file {
                Some(file) => append::read_json_events(&file)?,
                None => vec![append::event_from_args(
                    event_type.as_deref().unwrap_or_default(),
                    account_id.unwrap_or_default(),
                    strategy_id.unwrap_or_default(),
                    coin.as_deref().unwrap_or_default(),
                    amount.as_deref().unwrap_or_default(),
                    trace_id.as_deref().unwrap_or_default(),
                )?],
            };
            append::run(log.into(), &events)
        }
        Commands::Inspect { path } => inspect::run(&path),
        Commands::Dump { path, json } => dump::run(&path, json),
        Commands::Verify { path } => verify::run(&path),
    }
}

fn main() -> ExitCode {
    telemetry::init_tracing();

    let cli = Cli::parse();
    if cli.metrics {
        telemetry::init_metrics();
    }

    let result = run(cli.command);
    if cli.metrics {
        println!("{}", telemetry::render_metrics());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
