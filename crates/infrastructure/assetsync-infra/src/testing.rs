//! In-process stand-in for the replication store, for tests in this and
//! downstream crates.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// Every `ftpasync` call the fake store saw, arguments included.
pub type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

/// Reads one RESP array command. `None` on EOF or malformed input.
pub fn read_command<R: BufRead>(reader: &mut R) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

/// Minimal RESP server on `127.0.0.1:0`. Answers `PING`, records `ftpasync`
/// calls and rejects destinations ending in `/` like the real store does.
pub struct FakeStore {
    pub port: u16,
    pub calls: CallLog,
}

impl FakeStore {
    pub fn start() -> Self {
        Self::start_with_hang_up(None)
    }

    /// Like [`FakeStore::start`], but drops the connection instead of
    /// answering once more than `limit` ftpasync calls have arrived.
    pub fn start_with_hang_up(limit: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake store");
        let port = listener.local_addr().expect("fake store addr").port();
        let calls: CallLog = Arc::default();
        let calls_ref = calls.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let calls = calls_ref.clone();
                thread::spawn(move || serve(stream, calls, limit));
            }
        });

        Self { port, calls }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("call log poisoned").clone()
    }
}

fn serve(stream: TcpStream, calls: CallLog, limit: Option<usize>) {
    let Ok(mut writer) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);
    while let Some(args) = read_command(&mut reader) {
        let reply: &[u8] = match args[0].to_ascii_lowercase().as_str() {
            "ping" => b"+PONG\r\n",
            "ftpasync" => {
                let seen = {
                    let mut calls = calls.lock().expect("call log poisoned");
                    calls.push(args.clone());
                    calls.len()
                };
                if limit.is_some_and(|limit| seen > limit) {
                    return;
                }
                if args.len() != 3 || args[2].ends_with('/') {
                    b"-ERR error params\r\n"
                } else {
                    b"+OK\r\n"
                }
            }
            _ => b"+OK\r\n",
        };
        if writer.write_all(reply).is_err() {
            return;
        }
    }
}

/// A local port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("free port addr").port()
}
