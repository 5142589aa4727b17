//! Bounded line reader
//!
//! Collects trimmed, non-empty lines from a blocking source until a line
//! limit, a deadline, end of input or a read error, whichever comes first.
//!
//! The blocking read loop runs on its own thread and hands lines over an
//! unbounded channel. The caller races each receive against the deadline.
//! When the deadline wins, whatever the loop already queued is drained
//! without waiting, then the receiver is dropped and the read loop is
//! abandoned: its next send fails and the thread exits on its own, or it
//! stays parked in `read` until the producer wakes up.
//!
//! Lines end at `\n`, `\r` or `\r\n`. Bytes that are not valid UTF-8 are
//! replaced with U+FFFD rather than failing the read.

use std::io::{self, BufRead, BufReader, Read};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// Why the reader stopped collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CountLimit,
    Deadline,
    EndOfInput,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::CountLimit => "count_limit",
            StopReason::Deadline => "deadline",
            StopReason::EndOfInput => "end_of_input",
        }
    }
}

/// Lines in source order plus the condition that ended collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedLines {
    pub lines: Vec<String>,
    pub stop_reason: StopReason,
}

impl CollectedLines {
    fn empty(stop_reason: StopReason) -> Self {
        Self { lines: Vec::new(), stop_reason }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundedLineReader {
    max_lines: usize,
    max_time: Duration,
}

impl BoundedLineReader {
    pub fn new(max_lines: usize, max_time: Duration) -> Self {
        Self { max_lines, max_time }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    /// Read lines from `source` within the configured bounds.
    ///
    /// Reaching the deadline is not an error: whatever was collected so far
    /// is returned with `StopReason::Deadline`. A failure of the underlying
    /// source is returned as `Err`.
    pub async fn read<R>(&self, source: R) -> io::Result<CollectedLines>
    where
        R: Read + Send + 'static,
    {
        // None only when max_time overflows the clock, i.e. no deadline
        let deadline = Instant::now().checked_add(self.max_time);

        if self.max_lines == 0 {
            return Ok(CollectedLines::empty(StopReason::CountLimit));
        }
        if self.max_time.is_zero() {
            return Ok(CollectedLines::empty(StopReason::Deadline));
        }

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        spawn_read_loop(source, self.max_lines, line_tx)?;

        let mut lines = Vec::new();
        let stop_reason = loop {
            if lines.len() >= self.max_lines {
                break StopReason::CountLimit;
            }

            let received = match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        break drain_ready(&mut line_rx, &mut lines, self.max_lines)?;
                    }
                    match timeout_at(deadline, line_rx.recv()).await {
                        Ok(received) => received,
                        Err(_) => break drain_ready(&mut line_rx, &mut lines, self.max_lines)?,
                    }
                }
                None => line_rx.recv().await,
            };

            match received {
                Some(Ok(line)) => lines.push(line),
                Some(Err(e)) => {
                    debug!(lines = %lines.len(), error = %e, "line_read_failed");
                    return Err(e);
                }
                None => break StopReason::EndOfInput,
            }
        };

        debug!(
            lines = %lines.len(),
            stop_reason = %stop_reason.as_str(),
            max_lines = %self.max_lines,
            max_time_ms = %self.max_time.as_millis(),
            "line_collection_stopped"
        );

        Ok(CollectedLines { lines, stop_reason })
    }
}

/// Take what the read loop queued before the deadline, without waiting for
/// more. A queued read error fails the call.
fn drain_ready(
    line_rx: &mut UnboundedReceiver<io::Result<String>>,
    lines: &mut Vec<String>,
    max_lines: usize,
) -> io::Result<StopReason> {
    while lines.len() < max_lines {
        match line_rx.try_recv() {
            Ok(Ok(line)) => lines.push(line),
            Ok(Err(e)) => {
                debug!(lines = %lines.len(), error = %e, "line_read_failed");
                return Err(e);
            }
            Err(TryRecvError::Empty) => return Ok(StopReason::Deadline),
            Err(TryRecvError::Disconnected) => return Ok(StopReason::EndOfInput),
        }
    }
    Ok(StopReason::CountLimit)
}

fn spawn_read_loop<R>(
    source: R,
    max_lines: usize,
    line_tx: UnboundedSender<io::Result<String>>,
) -> io::Result<()>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("line-reader".to_string())
        .spawn(move || read_loop(source, max_lines, &line_tx))?;
    Ok(())
}

/// Blocking loop. Exits on EOF, read error, `max_lines` sent, or when the
/// receiving side has gone away.
fn read_loop<R: Read>(source: R, max_lines: usize, line_tx: &UnboundedSender<io::Result<String>>) {
    let mut reader = BufReader::new(source);
    let mut raw = Vec::new();
    let mut sent = 0usize;

    loop {
        match read_raw_line(&mut reader, &mut raw) {
            Ok(false) => return,
            Ok(true) => {
                let line = String::from_utf8_lossy(&raw);
                let line = trim_control(&line);
                // "\r\n" shows up here as an empty line after the "\r"
                if line.is_empty() {
                    continue;
                }
                if line_tx.send(Ok(line.to_string())).is_err() {
                    return;
                }
                sent += 1;
                if sent >= max_lines {
                    return;
                }
            }
            Err(e) => {
                let _ = line_tx.send(Err(e));
                return;
            }
        }
    }
}

/// Read up to the next `\n` or `\r` into `buf`, terminator excluded.
/// Returns `false` at end of input with nothing read.
fn read_raw_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    loop {
        let (done, used) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(!buf.is_empty());
            }
            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(i) => {
                    buf.extend_from_slice(&available[..i]);
                    (true, i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if done {
            return Ok(true);
        }
    }
}

/// Strip ASCII control characters and spaces from both ends
fn trim_control(line: &str) -> &str {
    line.trim_matches(|c: char| c <= ' ')
}
