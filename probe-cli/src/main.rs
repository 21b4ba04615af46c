//! # consistency-test
//!
//! Continuous consistency tester for Redis and Redis Cluster.
//!
//! Reads and increments counters as fast as it can, remembering the value
//! each write returned, and reports once per second how many writes were
//! lost (the store went backwards) or applied without acknowledgment (the
//! store went forwards), together with the duration of the last and longest
//! outage.
//!
//! ## Example
//!
//! ```bash
//! # Probe a local node
//! consistency-test 127.0.0.1 6379
//!
//! # Slower, with a larger timeout and connection logging
//! consistency-test 127.0.0.1 7000 --delay-ms 1 --timeout-ms 500 -vv
//! ```
//!
//! Output lines look like:
//!
//! ```text
//! 98231 R (0 err) | 98231 W (0 err)
//! Writing: CLUSTERDOWN The cluster is down
//! 120442 R (1102 err) | 120442 W (1102 err) | 3 lost | last outage 2s
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;

use probe_client::{ConsistencyTester, RespStore};
use probe_core::SystemClock;

mod config;

use config::Config;

/// Continuous consistency tester for Redis and Redis Cluster.
#[derive(Parser, Debug)]
#[command(name = "consistency-test")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host of the seed node
    host: String,

    /// Port of the seed node
    port: u16,

    /// TOML config file (flags override its values)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Pause after each iteration, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Per-request timeout, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Size of the hot key pool
    #[arg(long)]
    working_set: Option<u64>,

    /// Size of the cold key pool
    #[arg(long)]
    keyspace: Option<u64>,

    /// Cluster redirections followed per request
    #[arg(long)]
    max_redirects: Option<usize>,

    /// Log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// File config (or defaults) with command line overrides applied.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(v) = self.delay_ms {
            config.workload.delay_ms = v;
        }
        if let Some(v) = self.working_set {
            config.workload.working_set = v;
        }
        if let Some(v) = self.keyspace {
            config.workload.keyspace = v;
        }
        if let Some(v) = self.timeout_ms {
            config.store.timeout_ms = v;
        }
        if let Some(v) = self.max_redirects {
            config.store.max_redirects = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// `host:port`, bracketing bare IPv6 hosts.
    fn seed_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    init_tracing(cli.verbose);

    let config = cli.load_config().context("Failed to load configuration")?;
    let seed = cli.seed_addr();

    let store = RespStore::new(seed.clone(), config.store_config());
    let mut tester = ConsistencyTester::new(
        store,
        SystemClock,
        config.tester_config(),
        std::io::stdout(),
    )
    .context("Invalid key pool sizes")?;

    tracing::info!("Testing consistency against {}", seed);

    let interrupted = tokio::select! {
        result = tester.run() => {
            result.context("Failed to write report")?;
            false
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            true
        }
    };

    if interrupted {
        println!("{}", tester.summary());
    }

    Ok(())
}

/// Parse the command line, always ending a parse error with the usage line.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let message = e.to_string();
            eprint!("{}", message);
            if !message.contains("Usage:") {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            process::exit(e.exit_code());
        }
    }
}

/// Log to stderr; `RUST_LOG` wins unless `-v` was given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        1 => tracing_subscriber::EnvFilter::new("info"),
        _ => tracing_subscriber::EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
