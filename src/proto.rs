// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

//! The handful of SECoP wire lines the benchmark and the stub node speak.

use serde_json::{Value, json};

/// Identification reply, in its SCPI-compatible form.
pub const IDENT_REPLY: &str = "SINE2020&ISSE,SECoP,V2018-11-07,v1.0\\beta";

/// Value and timestamp a freshly started node reports for its parameters.
pub const SENTINEL: f64 = 0.0;

pub fn read_request(name: &str) -> String {
    format!("read {name}\n")
}

/// `update <name> [<value>,{"t":<timestamp>}]`
pub fn update_reply(name: &str, value: Value, timestamp: f64) -> String {
    format!("update {name} {}\n", json!([value, {"t": timestamp}]))
}

pub fn pong_reply(token: &str, timestamp: f64) -> String {
    format!("pong {token} {}\n", json!([null, {"t": timestamp}]))
}

/// Error reply echoing the offending line back in the report.
pub fn error_reply(line: &str, reason: &str) -> String {
    format!("error ProtocolError {}\n", json!([line, reason, {}]))
}
