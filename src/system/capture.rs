// src/system/capture.rs

//! Draining of captured child streams.
//!
//! A child that fills its pipe buffer blocks until the parent reads. Each captured stream
//! is therefore read to EOF by its own task, spawned at launch time, so the exit wait and
//! both drains progress independently. The text is only materialized once EOF is seen.

use std::fmt;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::{JoinError, JoinHandle};

/// Identifies which child stream a capture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Errors raised while draining a captured stream.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Reading from the pipe failed.
    #[error("Failed to read captured {stream}: {source}")]
    Read {
        /// The stream being drained.
        stream: StreamKind,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The drain task did not run to completion.
    #[error("Capture task for {stream} did not complete: {source}")]
    Join {
        /// The stream being drained.
        stream: StreamKind,
        /// The underlying task error.
        #[source]
        source: JoinError,
    },
}

/// An in-flight drain of one captured stream.
#[derive(Debug)]
pub struct StreamCapture {
    stream: StreamKind,
    task: JoinHandle<Result<String, CaptureError>>,
}

impl StreamCapture {
    /// Starts draining `reader` on a new task. Must be called from within a tokio runtime.
    pub(crate) fn spawn<R>(stream: StreamKind, mut reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            reader
                .read_to_end(&mut buffer)
                .await
                .map_err(|source| CaptureError::Read { stream, source })?;
            log::trace!("Drained {} bytes from {}", buffer.len(), stream);
            Ok::<_, CaptureError>(materialize(stream, buffer))
        });
        Self { stream, task }
    }

    /// Which stream this capture drains.
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Suspends until the stream has been read to EOF and returns the captured text.
    pub async fn finish(self) -> Result<String, CaptureError> {
        let stream = self.stream;
        self.task
            .await
            .map_err(|source| CaptureError::Join { stream, source })?
    }
}

/// Decodes drained bytes as UTF-8 (lossily) and trims trailing whitespace once.
fn materialize(stream: StreamKind, bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Captured {} is not valid UTF-8; invalid sequences were replaced.", stream);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    trim_trailing_whitespace(text)
}

fn trim_trailing_whitespace(mut text: String) -> String {
    let trimmed_len = text.trim_end().len();
    text.truncate(trimmed_len);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_newlines_are_trimmed_once() {
        assert_eq!(materialize(StreamKind::Stdout, b"line1\nline2\r\n\r\n".to_vec()), "line1\nline2");
        assert_eq!(materialize(StreamKind::Stdout, b"  keep leading \t\n".to_vec()), "  keep leading");
        assert_eq!(materialize(StreamKind::Stderr, b"\n\n".to_vec()), "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let text = materialize(StreamKind::Stdout, vec![b'o', b'k', 0xff, b'\n']);
        assert_eq!(text, "ok\u{fffd}");
    }

    #[tokio::test]
    async fn test_drain_reads_until_eof() {
        let data = vec![b'x'; 200_000];
        let capture = StreamCapture::spawn(StreamKind::Stdout, std::io::Cursor::new(data));
        assert_eq!(capture.stream(), StreamKind::Stdout);
        let text = capture.finish().await.unwrap();
        assert_eq!(text.len(), 200_000);
        assert!(text.bytes().all(|b| b == b'x'));
    }
}
