// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

//! Load generator for line-oriented SECoP nodes.
//!
//! A run opens a pool of connections, pipelines a batch of `read` requests on each, and measures
//! the time until every connection has received the exact reply it expects.

pub mod error;
pub mod exchange;
pub mod node;
pub mod pool;
pub mod proto;
pub mod scenario;

use std::time::Duration;

pub use error::BenchError;
pub use scenario::Scenario;

pub const DEFAULT_HOST: &str = "localhost";

/// Well-known SECoP port.
pub const DEFAULT_PORT: u16 = 10767;

pub const DEFAULT_MESSAGES: usize = 1000;

pub const DEFAULT_SUBSCRIBERS: usize = 10;

/// Per-connection receive budget used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a benchmark run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Number of request lines pipelined on each connection.
    pub messages: usize,
    /// Number of connections in the pool.
    pub subscribers: usize,
    pub timeout: Duration,
    pub scenario: Scenario,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            messages: DEFAULT_MESSAGES,
            subscribers: DEFAULT_SUBSCRIBERS,
            timeout: DEFAULT_TIMEOUT,
            scenario: Scenario::AskOnly,
        }
    }
}
