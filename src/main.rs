//! Command-line entry point: one bounded stress run per invocation.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use rwsem_stress::config::HarnessConfig;
use rwsem_stress::core::{run_configured, AppResult, HarnessError, RunReport};
use rwsem_stress::rwlock::LockKind;
use rwsem_stress::util::init_tracing_with;

#[derive(Parser, Debug)]
#[command(
    name = "rwsem-stress",
    version,
    about = "Stress a reader/writer lock with atomic downgrade and check its invariants",
    long_about = "Spawns reader, writer and downgrader threads that hammer a lock for a bounded \
                  time, checking mutual-exclusion invariants on every transition. Exits 0 when no \
                  violations were seen, 1 when some were."
)]
struct Cli {
    /// JSON configuration file; flags and environment override its values
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of reader threads
    #[arg(short, long, env = "RWSEM_READERS")]
    readers: Option<usize>,

    /// Number of writer threads
    #[arg(short, long, env = "RWSEM_WRITERS")]
    writers: Option<usize>,

    /// Number of downgrader threads
    #[arg(short, long, env = "RWSEM_DOWNGRADERS")]
    downgraders: Option<usize>,

    /// Seconds to run for
    #[arg(short = 't', long = "duration", value_name = "SECS", env = "RWSEM_DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Yield the CPU after every loop iteration
    #[arg(
        long = "yield",
        env = "RWSEM_YIELD",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    cooperative_yield: Option<bool>,

    /// Lock implementation to put under test
    #[arg(short, long, value_enum, env = "RWSEM_LOCK")]
    lock: Option<LockKind>,

    /// Also run a sampling monitor thread
    #[arg(long)]
    monitor: bool,

    /// Ceiling on the total number of worker threads
    #[arg(long, env = "RWSEM_MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Defaults, then the config file, then environment and flags.
    fn harness_config(&self) -> Result<HarnessConfig, HarnessError> {
        let mut cfg = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(readers) = self.readers {
            cfg.readers = readers;
        }
        if let Some(writers) = self.writers {
            cfg.writers = writers;
        }
        if let Some(downgraders) = self.downgraders {
            cfg.downgraders = downgraders;
        }
        if let Some(secs) = self.duration_secs {
            cfg.duration_secs = secs;
        }
        if let Some(enabled) = self.cooperative_yield {
            cfg.cooperative_yield = enabled;
        }
        if let Some(lock) = self.lock {
            cfg.lock = lock;
        }
        if let Some(max) = self.max_workers {
            cfg.max_workers = max;
        }
        cfg.monitor |= self.monitor;

        cfg.validate().map_err(HarnessError::Config)?;
        Ok(cfg)
    }
}

fn main() {
    // A missing .env file is fine; the variables are optional.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_tracing_with(level);

    match run(&cli) {
        Ok(report) => {
            if !report.passed() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            let exit_code = match e.downcast_ref::<HarnessError>() {
                Some(HarnessError::SetupFailure { .. }) => 3,
                Some(_) => 2,
                None => 1,
            };
            process::exit(exit_code);
        }
    }
}

fn run(cli: &Cli) -> AppResult<RunReport> {
    let cfg = cli.harness_config()?;
    let report = run_configured(cfg)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(report)
}
