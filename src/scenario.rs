// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

use log::*;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::exchange::{Batch, Connection};
use crate::{BenchError, Config, pool};

/// Parameter every scenario reads.
pub const TARGET: &str = "cryo:target";

/// The benchmarks this harness knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Pipeline `messages` reads of one parameter on every connection and check the updates.
    AskOnly,
}

impl Scenario {
    pub const ALL: &'static [Scenario] = &[Scenario::AskOnly];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AskOnly => "ask_only",
        }
    }

    /// Run the scenario to completion and return the instant its timed section started.
    pub fn run(&self, config: &Config) -> Result<Instant, BenchError> {
        match self {
            Self::AskOnly => ask_only(config),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|scenario| scenario.name() == s)
            .copied()
            .ok_or_else(|| BenchError::UnknownScenario(s.to_string()))
    }
}

fn ask_only(config: &Config) -> Result<Instant, BenchError> {
    let streams = pool::connect(&config.addr(), config.subscribers)?;
    let mut connections: Vec<Connection> = streams
        .into_iter()
        .enumerate()
        .map(|(index, stream)| Connection::new(index, stream))
        .collect();

    // Expects every timestamp on the node to still be zero, so the reply is reproducible.
    let batch = Batch::new(TARGET, config.messages)?;
    info!(
        "{}: {} connections, {} requests ({} bytes) each, expecting {} bytes back",
        Scenario::AskOnly,
        connections.len(),
        config.messages,
        batch.query.len(),
        batch.reply.len()
    );

    let start = Instant::now();
    for conn in connections.iter_mut() {
        conn.send(&batch.query)?;
    }
    for conn in connections.iter_mut() {
        conn.receive(batch.reply.len(), config.timeout)?;
    }
    for conn in &connections {
        conn.validate(&batch.reply)?;
    }

    Ok(start)
}
