use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::Command;
use std::time::Duration;

use secop_bench::{BenchError, Config};

const PORT: u16 = 18767;

struct Node {
    process: std::process::Child,
}

impl Drop for Node {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

fn start_node(port: u16) -> Node {
    let node = Node {
        process: Command::new(env!("CARGO_BIN_EXE_stub_node"))
            .args(["-p", &port.to_string()])
            .spawn()
            .unwrap(),
    };
    drop(client_connect(port));
    node
}

fn config(port: u16, messages: usize, subscribers: usize) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port,
        messages,
        subscribers,
        ..Config::default()
    }
}

#[test]
fn the_test() {
    let _node = start_node(PORT);

    let mut stream = client_connect(PORT);
    stream.write_all(b"*IDN?\nread cryo:target\n").unwrap();

    let expected = "SINE2020&ISSE,SECoP,V2018-11-07,v1.0\\beta\nupdate cryo:target [0.0,{\"t\":0.0}]\n";
    let mut buf = vec![0; expected.len()];
    stream.read_exact(&mut buf).unwrap();
    assert_eq!(buf, expected.as_bytes());

    for (messages, subscribers) in [(0, 1), (3, 1), (1000, 10), (200, 0)] {
        let config = config(PORT, messages, subscribers);
        let start = config.scenario.run(&config).unwrap();
        assert!(start.elapsed() < config.timeout);
    }
}

#[test]
fn bench_binary_reports_seconds() {
    let port = PORT + 1;
    let _node = start_node(port);

    let output = Command::new(env!("CARGO_BIN_EXE_bench"))
        .args(["-c", "127.0.0.1", "-p", &port.to_string()])
        .args(["-n", "1000", "-s", "10", "ask_only"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let secs: f64 = stdout.trim().strip_suffix(" sec").unwrap().parse().unwrap();
    assert!((0.0..10.0).contains(&secs));
    let fraction = stdout.trim().split_once('.').unwrap().1;
    assert_eq!(fraction.len(), "0000 sec".len());
}

#[test]
fn bench_binary_fails_on_unknown_scenario() {
    let output = Command::new(env!("CARGO_BIN_EXE_bench"))
        .args(["-p", &(PORT + 2).to_string(), "ask_everything"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn unreachable_node_fails_run() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = config(port, 10, 2);
    assert!(matches!(
        config.scenario.run(&config),
        Err(BenchError::Connect { index: 0, .. })
    ));
}

fn client_connect(port: u16) -> TcpStream {
    for _ in 0..50 {
        match TcpStream::connect(format!("127.0.0.1:{port}")) {
            Ok(stream) => return stream,
            Err(_) => std::thread::sleep(Duration::from_millis(10)),
        }
    }

    panic!("Should have been able to connect to node by now.");
}
