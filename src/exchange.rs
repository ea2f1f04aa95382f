// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

//! Pipelined request/reply exchange over a pool of connections.

use log::*;
use serde_json::json;

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use crate::BenchError;
use crate::proto;

const READ_CHUNK: usize = 64 * 1024;

/// Number of received bytes quoted in a mismatch report.
const EXCERPT_LEN: usize = 1000;

/// The requests sent on a connection and the reply they must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub query: Vec<u8>,
    pub reply: Vec<u8>,
}

impl Batch {
    /// `count` reads of `name`, answered by `count` sentinel updates. No I/O happens here.
    pub fn new(name: &str, count: usize) -> Result<Self, BenchError> {
        let request = proto::read_request(name);
        let update = proto::update_reply(name, json!(proto::SENTINEL), proto::SENTINEL);

        Ok(Self {
            query: repeat_line(&request, count)?,
            reply: repeat_line(&update, count)?,
        })
    }
}

fn repeat_line(line: &str, count: usize) -> Result<Vec<u8>, BenchError> {
    let total = line
        .len()
        .checked_mul(count)
        .ok_or(BenchError::BatchTooLarge { count })?;

    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(total).map_err(|_| BenchError::BatchTooLarge { count })?;
    for _ in 0..count {
        buf.extend_from_slice(line.as_bytes());
    }
    Ok(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unsent,
    Sent,
    /// At least the expected number of bytes arrived.
    Complete,
    /// The budget ran out, or the peer closed, short of the expected length.
    TimedOut,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unsent => write!(f, "unsent"),
            Self::Sent => write!(f, "sent"),
            Self::Complete => write!(f, "complete"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// One pooled connection and the bytes it has received so far.
#[derive(Debug)]
pub struct Connection {
    index: usize,
    stream: TcpStream,
    state: State,
    received: Vec<u8>,
}

impl Connection {
    pub fn new(index: usize, stream: TcpStream) -> Self {
        Self {
            index,
            stream,
            state: State::Unsent,
            received: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Write the whole batch in one go. A short write is an error, not something to resume.
    pub fn send(&mut self, query: &[u8]) -> Result<(), BenchError> {
        let index = self.index;
        self.stream
            .write_all(query)
            .and_then(|()| self.stream.flush())
            .map_err(|source| BenchError::Send { index, source })?;

        trace!("connection {index}: sent {} bytes", query.len());
        self.state = State::Sent;
        Ok(())
    }

    /// Accumulate reply bytes until `expected_len` is reached or `budget` has elapsed.
    ///
    /// The deadline is checked before every read and each read is bounded by the remaining
    /// budget, so a silent peer cannot stall the loop. A closed peer ends it immediately.
    pub fn receive(&mut self, expected_len: usize, budget: Duration) -> Result<State, BenchError> {
        let index = self.index;
        let start = Instant::now();
        let mut buf = vec![0; READ_CHUNK];

        self.state = loop {
            if self.received.len() >= expected_len {
                break State::Complete;
            }

            let remaining = match budget.checked_sub(start.elapsed()) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => {
                    warn!(
                        "connection {index}: timed out after {budget:?} with {} of {expected_len} bytes",
                        self.received.len()
                    );
                    break State::TimedOut;
                }
            };

            self.stream
                .set_read_timeout(Some(remaining))
                .map_err(|source| BenchError::Recv { index, source })?;

            match self.stream.read(&mut buf) {
                Ok(0) => {
                    warn!(
                        "connection {index}: peer closed with {} of {expected_len} bytes",
                        self.received.len()
                    );
                    break State::TimedOut;
                }
                Ok(n) => {
                    trace!("connection {index}: read {n} bytes");
                    self.received.extend_from_slice(&buf[..n]);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                Err(source) => return Err(BenchError::Recv { index, source }),
            }
        };

        debug!(
            "connection {index}: {} with {} bytes in {:?}",
            self.state,
            self.received.len(),
            start.elapsed()
        );
        Ok(self.state)
    }

    pub fn validate(&self, expected: &[u8]) -> Result<(), BenchError> {
        validate(self.index, &self.received, expected)
    }
}

/// Byte-exact comparison of a received reply against the expected one.
pub fn validate(index: usize, actual: &[u8], expected: &[u8]) -> Result<(), BenchError> {
    if actual == expected {
        return Ok(());
    }

    let excerpt = &actual[..actual.len().min(EXCERPT_LEN)];
    Err(BenchError::Mismatch {
        index,
        expected_len: expected.len(),
        actual_len: actual.len(),
        excerpt: String::from_utf8_lossy(excerpt).into_owned(),
    })
}
