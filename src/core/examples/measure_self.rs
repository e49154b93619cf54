//! Monitors the current process around a couple of plain HTTP requests and
//! prints the resulting report.
//!
//! Run with: cargo run --example measure_self -- [host ...]

use env_logger::Env;
use log::{info, warn};
use netusage::configuration::Config;
use netusage::SessionTracker;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

fn fetch(host: &str) -> std::io::Result<usize> {
    let mut stream = TcpStream::connect((host, 80))?;
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    write!(
        stream,
        "GET / HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        host
    )?;
    let mut body = Vec::new();
    stream.read_to_end(&mut body)?;
    Ok(body.len())
}

fn main() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    let hosts: Vec<String> = std::env::args().skip(1).collect();
    let hosts = if hosts.is_empty() {
        vec!["example.com".to_string(), "example.org".to_string()]
    } else {
        hosts
    };

    let tracker = SessionTracker::new(&Config::default());
    let pid = std::process::id();

    tracker.start(pid).expect("start monitoring");
    for host in &hosts {
        match fetch(host) {
            Ok(bytes) => info!("fetched {} bytes from {}", bytes, host),
            Err(e) => warn!("request to {} failed: {}", host, e),
        }
    }
    let report = tracker.end(pid).expect("end monitoring");

    println!("{}", serde_json::to_string_pretty(&report).expect("serialize report"));
}
