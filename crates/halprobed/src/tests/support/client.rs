//! Minimal agent speaking the line protocol over the daemon socket.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use halprobe_types::{CommandRecord, ResponseRecord};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One agent connection.
pub(crate) struct AgentClient {
    writer: UnixStream,
    reader: BufReader<UnixStream>,
}

impl AgentClient {
    /// Connects to `path`, retrying while the daemon is still binding.
    pub(crate) fn connect(path: &Utf8Path) -> Self {
        let deadline = Instant::now() + CONNECT_TIMEOUT;
        let stream = loop {
            match UnixStream::connect(path) {
                Ok(stream) => break stream,
                Err(error) if Instant::now() >= deadline => {
                    panic!("failed to connect to {path}: {error}")
                }
                Err(_) => thread::sleep(POLL_INTERVAL),
            }
        };
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("set read timeout");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        Self {
            writer: stream,
            reader,
        }
    }

    /// Sends `command` and waits for its response.
    pub(crate) fn send(&mut self, command: &CommandRecord) -> ResponseRecord {
        self.send_raw(&serde_json::to_string(command).expect("encode command"));
        self.receive().expect("daemon closed the connection")
    }

    /// Writes `line` followed by a newline.
    pub(crate) fn send_raw(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .expect("write command");
        self.writer.flush().expect("flush command");
    }

    /// Reads the next response, or `None` once the daemon has hung up.
    pub(crate) fn receive(&mut self) -> Option<ResponseRecord> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).expect("read response");
        (read > 0).then(|| serde_json::from_str(&line).expect("decode response"))
    }
}
