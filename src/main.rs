//! Arcanum -- a combat and spell-casting resolution engine.
//!
//! This binary reads JSON-lines commands from stdin and writes the messages
//! each one produces to stdout, one JSON object per line. Logs go to stderr.
//!
//! Usage:
//!   arcanum [--scenario FILE] [--seed N]
//!
//! Options:
//!   --scenario FILE  Scenario to load before reading commands
//!   --seed N         Random seed, 0 for entropy (default: 0)

use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use arcanum::engine::Engine;
use arcanum::protocol::{parse_command, Scenario};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut scenario_path: Option<String> = None;
    let mut seed: u64 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                scenario_path = args.get(i).cloned();
            }
            "--seed" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(s) => seed = s,
                    None => {
                        error!("invalid --seed value");
                        return ExitCode::FAILURE;
                    }
                }
            }
            other => {
                error!(arg = other, "unknown argument");
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let mut engine = Engine::new(seed);
    if let Some(path) = scenario_path {
        match Scenario::load(&path) {
            Ok(scenario) => engine.load(scenario),
            Err(e) => {
                error!(%path, error = %e, "failed to load scenario");
                return ExitCode::FAILURE;
            }
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        match engine.handle(cmd, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!(error = %e, "cannot write output");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
