//! Plain socket transport: bytes in, envelope text out.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::channel::{ReadOutcome, Transport};
use super::errors::TransportError;
use super::stream::ConnectionStream;
use super::TRANSPORT_TARGET;

const READ_CHUNK_BYTES: usize = 8 * 1024;
const WRITE_BACKOFF: Duration = Duration::from_millis(1);
const WRITE_DEADLINE: Duration = Duration::from_secs(5);

/// Transport over an accepted stream with no message framing of its own.
#[derive(Debug)]
pub struct RawTransport {
    stream: ConnectionStream,
    chunk: Vec<u8>,
    closed: bool,
}

impl RawTransport {
    /// Wraps a stream, switching it to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] when the mode cannot be changed.
    pub fn new(stream: ConnectionStream) -> Result<Self, TransportError> {
        stream.set_nonblocking(true)?;
        Ok(Self {
            stream,
            chunk: vec![0; READ_CHUNK_BYTES],
            closed: false,
        })
    }
}

impl Transport for RawTransport {
    fn try_read(&mut self) -> Result<ReadOutcome, TransportError> {
        if self.closed {
            return Ok(ReadOutcome::Closed);
        }
        loop {
            match self.stream.read(&mut self.chunk) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(read) => {
                    let bytes = self.chunk.get(..read).map(<[u8]>::to_vec).unwrap_or_default();
                    return Ok(ReadOutcome::Data(bytes));
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadOutcome::Pending);
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), TransportError> {
        let bytes = text.as_bytes();
        let deadline = Instant::now() + WRITE_DEADLINE;
        let mut written = 0;
        while let Some(remaining) = bytes.get(written..).filter(|rest| !rest.is_empty()) {
            match self.stream.write(remaining) {
                Ok(0) => {
                    return Err(io::Error::from(io::ErrorKind::WriteZero).into());
                }
                Ok(count) => written += count,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(TransportError::WriteStalled {
                            written,
                            total: bytes.len(),
                        });
                    }
                    thread::sleep(WRITE_BACKOFF);
                }
                Err(error) => return Err(error.into()),
            }
        }
        self.stream.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(error) = self.stream.shutdown() {
            debug!(target: TRANSPORT_TARGET, %error, "raw stream already shut down");
        }
    }
}
