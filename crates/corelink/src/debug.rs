//! Streaming debug channel
//!
//! A module's debug output is pushed over a WebSocket that lives outside the
//! session's request lock and retry policy. [`DebugStream::run`] pumps lines to
//! the registered callback until the stream ends; the end is reported as a
//! [`StreamEnd`], not as an error.

use crate::error::{Error, Result};
use crate::observability::StreamContext;
use corelink_transport::LineSocket;
use http::HeaderMap;
use std::sync::Arc;
use tokio::sync::watch;

type LineCallback = Box<dyn FnMut(&str) + Send>;

/// Why a debug stream stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Core closed the stream
    RemoteClosed,
    /// A [`CloseHandle`] ended the stream
    LocalClosed,
    /// The socket failed
    TransportError(String),
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::RemoteClosed => write!(f, "remote closed"),
            EndReason::LocalClosed => write!(f, "local closed"),
            EndReason::TransportError(err) => write!(f, "transport error: {}", err),
        }
    }
}

/// Summary returned when [`DebugStream::run`] finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEnd {
    /// Why the stream stopped
    pub reason: EndReason,
    /// Lines delivered to the callback
    pub lines: u64,
}

/// Ends a running [`DebugStream`] from another task.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    /// Ask the stream to stop. Calling it more than once is harmless.
    pub fn close(&self) {
        self.tx.send_replace(true);
    }
}

/// Open debug stream of one module.
///
/// # Example
///
/// ```rust,no_run
/// use corelink::{Client, ClientConfig};
///
/// # async fn example() -> corelink::Result<()> {
/// let client = Client::new(ClientConfig::default())?;
/// let mut stream = client.debug_stream("m-42").await?;
/// stream.on_line(|line| println!("[m-42] {}", line));
///
/// let end = stream.run().await?;
/// println!("stream ended ({}) after {} lines", end.reason, end.lines);
/// # Ok(())
/// # }
/// ```
pub struct DebugStream {
    socket: LineSocket,
    module_id: String,
    on_line: Option<LineCallback>,
    close_tx: Arc<watch::Sender<bool>>,
    close_rx: watch::Receiver<bool>,
}

impl DebugStream {
    /// Connect to `url`, sending `headers` with the upgrade request.
    ///
    /// # Errors
    ///
    /// The handshake failure, surfaced as-is without retrying.
    pub async fn connect(url: &str, headers: &HeaderMap, module_id: &str) -> Result<Self> {
        let socket = LineSocket::connect(url, headers).await?;
        StreamContext::new(module_id).log_opened(url);

        let (close_tx, close_rx) = watch::channel(false);
        Ok(Self {
            socket,
            module_id: module_id.to_string(),
            on_line: None,
            close_tx: Arc::new(close_tx),
            close_rx,
        })
    }

    /// Module this stream belongs to.
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Register the callback receiving each complete line, replacing any
    /// previous one.
    pub fn on_line<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_line = Some(Box::new(callback));
    }

    /// A handle that ends [`run`](Self::run) locally.
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            tx: Arc::clone(&self.close_tx),
        }
    }

    /// Send one line to the module.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.socket.send(line).await?;
        Ok(())
    }

    /// Pump lines to the callback until the stream ends.
    ///
    /// Text is split on `\n`; a trailing partial line is held until its
    /// newline arrives, or delivered when the stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if no callback was registered. Every way the
    /// stream can end, a socket failure included, is reported in [`StreamEnd`].
    pub async fn run(self) -> Result<StreamEnd> {
        let DebugStream {
            mut socket,
            module_id,
            on_line,
            close_rx: mut closed,
            ..
        } = self;
        let mut on_line = on_line.ok_or_else(|| {
            Error::Stream(format!("no line callback registered for {}", module_id))
        })?;

        let mut ctx = StreamContext::new(&module_id);
        let mut buffer = LineBuffer::default();

        let reason = loop {
            if *closed.borrow_and_update() {
                let _ = socket.close().await;
                break EndReason::LocalClosed;
            }

            tokio::select! {
                changed = closed.changed() => {
                    if changed.is_err() || *closed.borrow() {
                        let _ = socket.close().await;
                        break EndReason::LocalClosed;
                    }
                }
                received = socket.recv() => match received {
                    Ok(Some(text)) => {
                        for line in buffer.push(&text) {
                            on_line(&line);
                            ctx.record_line();
                        }
                    }
                    Ok(None) => break EndReason::RemoteClosed,
                    Err(err) => break EndReason::TransportError(err.to_string()),
                },
            }
        };

        if let Some(rest) = buffer.finish() {
            on_line(&rest);
            ctx.record_line();
        }

        ctx.log_closed(&reason.to_string());
        Ok(StreamEnd {
            reason,
            lines: ctx.line_count,
        })
    }
}

impl std::fmt::Debug for DebugStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugStream")
            .field("module_id", &self.module_id)
            .field("socket", &self.socket)
            .finish_non_exhaustive()
    }
}

/// Longest line held back waiting for its newline, in bytes.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Splits incoming text into complete lines.
///
/// A partial line that reaches the byte limit is delivered as-is, so a peer
/// that never sends `\n` cannot grow the buffer without bound.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    partial: String,
    max_bytes: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub(crate) fn with_limit(max_bytes: usize) -> Self {
        Self {
            partial: String::new(),
            max_bytes: max_bytes.max(1),
        }
    }

    /// Append `chunk`, returning every line it completes.
    pub(crate) fn push(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);

        let mut lines = Vec::new();
        loop {
            let newline = self.partial.find('\n');
            match newline {
                Some(pos) if pos <= self.max_bytes => {
                    let mut line: String = self.partial.drain(..=pos).collect();
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                    lines.push(line);
                }
                _ if self.partial.len() >= self.max_bytes => {
                    let mut cut = self.max_bytes;
                    while !self.partial.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    if cut == 0 {
                        // A single char wider than the limit
                        cut = self.partial.chars().next().map_or(0, char::len_utf8);
                    }
                    lines.push(self.partial.drain(..cut).collect());
                }
                _ => break,
            }
        }
        lines
    }

    /// Whatever is left once the stream ends.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.partial))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_splits_and_holds_partial() {
        let mut buffer = LineBuffer::default();

        assert_eq!(buffer.push("boot ok\nloading"), vec!["boot ok"]);
        assert!(buffer.push(" driver").is_empty());
        assert_eq!(buffer.push("\r\nready\n\n"), vec!["loading driver", "ready", ""]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_delivers_overlong_partial() {
        let mut buffer = LineBuffer::with_limit(4);

        assert!(buffer.push("abc").is_empty());
        assert_eq!(buffer.push("defghij"), vec!["abcd", "efgh"]);
        assert_eq!(buffer.push("\nok\n"), vec!["ij", "ok"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_limit_respects_char_boundaries() {
        let mut buffer = LineBuffer::with_limit(4);

        // Byte 4 falls inside the second 'é', so the cut moves back to byte 3
        assert_eq!(buffer.push("aéé"), vec!["aé"]);
        assert_eq!(buffer.finish().as_deref(), Some("é"));
    }

    #[test]
    fn test_line_buffer_default_limit() {
        let mut buffer = LineBuffer::default();
        let long = "x".repeat(MAX_LINE_BYTES + 10);

        let lines = buffer.push(&long);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_LINE_BYTES);
        assert_eq!(buffer.finish().map(|rest| rest.len()), Some(10));
    }

    #[test]
    fn test_line_buffer_flushes_remainder() {
        let mut buffer = LineBuffer::default();
        buffer.push("tail without newline");
        assert_eq!(buffer.finish().as_deref(), Some("tail without newline"));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_end_reason_display() {
        assert_eq!(EndReason::RemoteClosed.to_string(), "remote closed");
        assert_eq!(
            EndReason::TransportError("reset".into()).to_string(),
            "transport error: reset"
        );
    }
}
