//! Event sources for the ingestion loop
//!
//! Each source is an iterator over raw input lines. The loop in
//! [`crate::Bridge::run`] accepts any of them, so the same dispatch logic
//! works on a blocking reader or on a producer/consumer channel.

use crate::types::{BridgeError, Result};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};

/// Line-oriented source over any buffered reader
///
/// Each line is decoded on its own. A line that is not valid UTF-8 is yielded
/// as [`BridgeError::InvalidInput`] and reading continues with the next one.
pub struct LineSource<R: BufRead> {
    reader: R,
    prompt: Option<String>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prompt: None,
        }
    }

    /// Builder method: print a prompt to stdout before every read
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if let Some(prompt) = &self.prompt {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
        }

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }

        String::from_utf8(buf).map(Some).map_err(|e| {
            BridgeError::InvalidInput(format!("line is not valid UTF-8 ({})", e.utf8_error()))
        })
    }
}

impl LineSource<io::StdinLock<'static>> {
    /// Source reading from standard input
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

/// Source fed by other threads through a channel
///
/// Blocks until a line arrives; ends once every sender is dropped.
pub struct ChannelSource {
    receiver: Receiver<String>,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<String>) -> Self {
        Self { receiver }
    }
}

impl Iterator for ChannelSource {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok().map(Ok)
    }
}

/// Create a connected sender and channel source
pub fn channel() -> (Sender<String>, ChannelSource) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelSource::new(rx))
}
