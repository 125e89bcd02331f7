//! Soak-test CLI.
//!
//! Plays random seeded sessions and reports invariant violations as JSONL.
//!
//! Usage:
//!   cargo run --release --bin soak -- [OPTIONS]
//!
//! Options:
//!   --sessions N    Number of sessions to play (default: 8)
//!   --combats N     Combats per session (default: 20)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)

use std::env;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arcanum::soak::{self, SoakConfig};

fn print_usage() {
    eprintln!("Usage: soak [--sessions N] [--combats N] [--threads N] [--seed N]");
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Option<T> {
    let parsed = args.get(i).and_then(|v| v.parse().ok());
    if parsed.is_none() {
        error!("invalid {flag} value");
    }
    parsed
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SoakConfig::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let parsed = match flag {
            "--sessions" => parse_value(&args, i + 1, flag).map(|v| config.num_sessions = v),
            "--combats" => parse_value(&args, i + 1, flag).map(|v| config.combats_per_session = v),
            "--threads" => parse_value(&args, i + 1, flag).map(|v| config.threads = v),
            "--seed" => parse_value(&args, i + 1, flag).map(|v| config.seed = v),
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other => {
                error!(arg = other, "unknown argument");
                print_usage();
                return ExitCode::FAILURE;
            }
        };
        if parsed.is_none() {
            return ExitCode::FAILURE;
        }
        i += 2;
    }

    info!(
        sessions = config.num_sessions,
        combats = config.combats_per_session,
        threads = config.threads,
        seed = config.seed,
        "soak starting"
    );
    let start = Instant::now();
    let results = match soak::run_soak(&config) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "cannot build thread pool");
            return ExitCode::FAILURE;
        }
    };

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = false;
    for (session_id, result) in results.into_iter().enumerate() {
        match result {
            Ok(report) => {
                failed |= !report.violations.is_empty();
                reports.push(report);
            }
            Err(e) => {
                error!(session_id, error = %e, "session aborted");
                failed = true;
            }
        }
    }
    info!(
        sessions = reports.len(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "soak finished"
    );

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    if let Err(e) = soak::write_jsonl(&reports, &mut writer) {
        error!(error = %e, "cannot write reports");
        return ExitCode::FAILURE;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
