// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

//! A stand-in SECoP node whose parameters never change, so that every reply is predictable.

use log::*;
use serde_json::json;

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use crate::proto;

/// Accept connections forever, serving each one on its own thread.
pub fn serve(listener: TcpListener) -> io::Result<()> {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream) {
                warn!("connection error: {e}");
            }
        });
    }

    Ok(())
}

/// Answer request lines until the client closes the connection.
///
/// Replies are buffered and only flushed once no further request is waiting in the read buffer,
/// so a pipelined batch is answered with few writes.
pub fn handle_connection(stream: TcpStream) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    debug!("accepted connection from {peer}");

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);
    let mut line = String::new();
    let mut handled: usize = 0;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        if let Some(reply) = respond(line.trim_end_matches(['\r', '\n'])) {
            writer.write_all(reply.as_bytes())?;
            handled += 1;
        }

        if reader.buffer().is_empty() {
            writer.flush()?;
        }
    }

    writer.flush()?;
    trace!("closing connection from {peer} after {handled} requests");
    Ok(())
}

/// The reply to one request line, if it warrants one.
pub fn respond(line: &str) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }

    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let reply = match verb {
        "*IDN?" if rest.is_empty() => format!("{}\n", proto::IDENT_REPLY),
        "read" => match rest.split_once(':') {
            Some((module, param)) if !module.is_empty() && !param.is_empty() => {
                proto::update_reply(rest, json!(proto::SENTINEL), proto::SENTINEL)
            }
            _ => proto::error_reply(line, "missing parameter"),
        },
        "ping" => proto::pong_reply(rest, proto::SENTINEL),
        _ => proto::error_reply(line, "no such message type"),
    };

    Some(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn answers_reads_with_sentinel_update() {
        assert_eq!(
            respond("read cryo:target").unwrap(),
            "update cryo:target [0.0,{\"t\":0.0}]\n"
        );
        assert_eq!(
            respond("read cryo:value").unwrap(),
            "update cryo:value [0.0,{\"t\":0.0}]\n"
        );
    }

    #[test]
    fn answers_identification_and_ping() {
        assert_eq!(
            respond("*IDN?").unwrap(),
            "SINE2020&ISSE,SECoP,V2018-11-07,v1.0\\beta\n"
        );
        assert_eq!(respond("ping 42").unwrap(), "pong 42 [null,{\"t\":0.0}]\n");
    }

    #[test]
    fn rejects_malformed_requests() {
        assert!(respond("read cryo").unwrap().starts_with("error ProtocolError"));
        assert!(respond("read :x").unwrap().contains("missing parameter"));
        assert!(respond("frobnicate").unwrap().contains("no such message type"));
        assert!(respond("").is_none());
        assert!(respond("   ").is_none());
    }

    #[test]
    fn error_report_is_valid_json_for_control_characters() {
        let reply = respond("frob\tx\u{1}").unwrap();
        let payload = reply
            .strip_prefix("error ProtocolError ")
            .unwrap()
            .trim_end_matches('\n');

        let report: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(report[0], "frob\tx\u{1}");
        assert_eq!(report[1], "no such message type");
        assert!(report[2].as_object().unwrap().is_empty());
        assert!(!reply.trim_end_matches('\n').contains('\n'));
    }

    #[test]
    fn serves_pipelined_batch() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || serve(listener));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(b"read cryo:target\r\n\nping\nread cryo:target\n")
            .unwrap();

        let expected = concat!(
            "update cryo:target [0.0,{\"t\":0.0}]\n",
            "pong  [null,{\"t\":0.0}]\n",
            "update cryo:target [0.0,{\"t\":0.0}]\n",
        );
        let mut buf = vec![0; expected.len()];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }
}
