//! Scripted transport for driving sessions without sockets.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crate::transport::{ReadOutcome, Transport, TransportError};

/// What the scripted transport has observed, shared with the test.
#[derive(Debug, Default)]
pub(crate) struct TransportLog {
    pub(crate) written: Vec<String>,
    pub(crate) reads: usize,
    pub(crate) closes: usize,
}

/// Transport that replays a fixed sequence of read results.
///
/// Once the script is exhausted every read is `Pending`.
pub(crate) struct ScriptedTransport {
    script: VecDeque<Result<ReadOutcome, TransportError>>,
    log: Arc<Mutex<TransportLog>>,
    fail_writes_after: Option<usize>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> (Self, Arc<Mutex<TransportLog>>) {
        let log = Arc::new(Mutex::new(TransportLog::default()));
        let transport = Self {
            script: VecDeque::new(),
            log: Arc::clone(&log),
            fail_writes_after: None,
        };
        (transport, log)
    }

    pub(crate) fn data(mut self, bytes: &str) -> Self {
        self.script
            .push_back(Ok(ReadOutcome::Data(bytes.as_bytes().to_vec())));
        self
    }

    pub(crate) fn pending(mut self) -> Self {
        self.script.push_back(Ok(ReadOutcome::Pending));
        self
    }

    pub(crate) fn closed(mut self) -> Self {
        self.script.push_back(Ok(ReadOutcome::Closed));
        self
    }

    pub(crate) fn read_error(mut self) -> Self {
        self.script.push_back(Err(TransportError::Io {
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        }));
        self
    }

    /// Lets `count` writes succeed, then fails every later one.
    pub(crate) fn fail_writes_after(mut self, count: usize) -> Self {
        self.fail_writes_after = Some(count);
        self
    }
}

impl Transport for ScriptedTransport {
    fn try_read(&mut self) -> Result<ReadOutcome, TransportError> {
        self.log.lock().expect("log lock").reads += 1;
        self.script.pop_front().unwrap_or(Ok(ReadOutcome::Pending))
    }

    fn write_text(&mut self, text: &str) -> Result<(), TransportError> {
        let mut log = self.log.lock().expect("log lock");
        if self
            .fail_writes_after
            .is_some_and(|limit| log.written.len() >= limit)
        {
            return Err(TransportError::Io {
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            });
        }
        log.written.push(text.to_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.log.lock().expect("log lock").closes += 1;
    }
}
