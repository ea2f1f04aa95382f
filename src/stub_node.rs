// SPDX-License-Identifier: MIT
// Copyright 2025. Thomas Bertschinger

use clap::Parser;

use std::io;
use std::net::TcpListener;

use secop_bench::{DEFAULT_PORT, node};

#[derive(Parser)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> io::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let listener = TcpListener::bind(format!("{}:{}", args.bind, args.port))?;
    println!("Listening on {}", listener.local_addr()?);

    node::serve(listener)
}
