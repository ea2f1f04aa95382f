// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

use clap::Parser;
use log::*;

use std::process::ExitCode;
use std::time::Duration;

use secop_bench::{
    BenchError, Config, DEFAULT_HOST, DEFAULT_MESSAGES, DEFAULT_PORT, DEFAULT_SUBSCRIBERS,
    DEFAULT_TIMEOUT,
};

#[derive(Parser)]
struct Args {
    /// SECoP node host
    #[arg(short = 'c', long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of messages per connection
    #[arg(short = 'n', long, default_value_t = DEFAULT_MESSAGES)]
    messages: usize,

    /// Number of subscribed connections
    #[arg(short = 's', long, default_value_t = DEFAULT_SUBSCRIBERS)]
    subscribers: usize,

    /// Receive budget per connection, in seconds
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Benchmark to run (ask_only)
    scenario: String,
}

impl Args {
    fn into_config(self) -> Result<Config, BenchError> {
        Ok(Config {
            scenario: self.scenario.parse()?,
            host: self.host,
            port: self.port,
            messages: self.messages,
            subscribers: self.subscribers,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{e}"))
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), BenchError> {
    let config = args.into_config()?;
    debug!("{config:?}");

    let start = config.scenario.run(&config)?;
    let elapsed = start.elapsed();

    println!("{:.4} sec", elapsed.as_secs_f64());
    Ok(())
}
