// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

use log::*;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::BenchError;

/// Open `count` connections to `addr`, one after another.
///
/// Either all connections are established or none are: on the first failure the connections
/// opened so far are dropped (and thereby closed) and the error is returned. No connect timeout is
/// applied beyond what the OS does by default.
pub fn connect(addr: &str, count: usize) -> Result<Vec<TcpStream>, BenchError> {
    let resolved: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|source| BenchError::Resolve {
            addr: addr.to_string(),
            source,
        })?
        .collect();

    let mut pool = Vec::with_capacity(count);
    for index in 0..count {
        let stream =
            TcpStream::connect(&resolved[..]).map_err(|source| BenchError::Connect {
                index,
                addr: addr.to_string(),
                source,
            })?;
        debug!("connection {index} established to {}", stream_peer(&stream));
        pool.push(stream);
    }

    Ok(pool)
}

fn stream_peer(stream: &TcpStream) -> String {
    match stream.peer_addr() {
        Ok(peer) => peer.to_string(),
        Err(e) => format!("<unknown: {e}>"),
    }
}
