// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

use std::io;

use thiserror::Error;

/// Any failure that invalidates a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to resolve {addr}: {source}")]
    Resolve { addr: String, source: io::Error },

    #[error("connection {index} to {addr} failed: {source}")]
    Connect {
        index: usize,
        addr: String,
        source: io::Error,
    },

    #[error("send on connection {index} failed: {source}")]
    Send { index: usize, source: io::Error },

    #[error("receive on connection {index} failed: {source}")]
    Recv { index: usize, source: io::Error },

    #[error(
        "reply mismatch on connection {index}: expected {expected_len} bytes, got {actual_len}: {excerpt:?}"
    )]
    Mismatch {
        index: usize,
        expected_len: usize,
        actual_len: usize,
        excerpt: String,
    },

    #[error("a batch of {count} lines does not fit in memory")]
    BatchTooLarge { count: usize },

    #[error("unknown benchmark scenario: {0}")]
    UnknownScenario(String),
}
