//! Job source: turns an input stream into a sequence of trimmed lines (URLs).
//!
//! The sequence ends when the sending side is dropped, which is how the pool's
//! dispatcher learns that no more jobs will arrive.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

/// What the reader saw before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSummary {
    /// Lines handed to the receiver (blank ones included).
    pub lines: usize,
    /// True if reading stopped on an I/O error rather than end of input.
    pub read_error: bool,
    /// True if the receiver hung up before input was exhausted.
    pub receiver_gone: bool,
}

/// Read `reader` line by line, sending each line trimmed of surrounding whitespace.
///
/// Blank lines are sent as empty strings. Invalid UTF-8 is decoded lossily.
/// A read error is logged and ends the sequence early; a partial line read before
/// the error is still sent.
pub fn read_jobs<R: BufRead>(mut reader: R, sink: &SyncSender<String>) -> SourceSummary {
    let mut summary = SourceSummary::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                if sink.send(line).is_err() {
                    tracing::debug!("job receiver dropped; stop reading input");
                    summary.receiver_gone = true;
                    break;
                }
                summary.lines += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // Bytes read before the error still form a job.
                if !buf.is_empty() {
                    let line = String::from_utf8_lossy(&buf).trim().to_string();
                    if sink.send(line).is_ok() {
                        summary.lines += 1;
                    } else {
                        summary.receiver_gone = true;
                    }
                }
                tracing::error!(error = %e, "reading input failed; no more jobs will be queued");
                summary.read_error = true;
                break;
            }
        }
    }
    summary
}

/// Start a reader thread over `input`. The returned receiver yields one job per line
/// and ends at end of input; the join handle reports what was read.
pub fn spawn_reader<R>(input: R) -> io::Result<(Receiver<String>, JoinHandle<SourceSummary>)>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<String>(0);
    let handle = thread::Builder::new()
        .name("urlcount-reader".into())
        .spawn(move || read_jobs(BufReader::new(input), &tx))?;
    Ok((rx, handle))
}
