//! Splits a delimiter-less byte stream into JSON object frames.
//!
//! Clients may send any number of JSON objects back to back with no
//! separator, and the transport may cut them at arbitrary points. The framer
//! accumulates bytes and yields each balanced `{ ... }` group in arrival
//! order, keeping any incomplete tail for the next read.
//!
//! Scanning is incremental: the scanner remembers where it stopped and the
//! current nesting depth, so every byte is inspected once no matter how many
//! reads an object spans. Only brace depth decides where a frame ends; string
//! contents are not interpreted, so a quoted brace shifts the boundary and
//! the resulting frame fails to decode. A stray quote never affects later
//! frames.
//!
//! Bytes before the first `{` are kept until an object completes and are then
//! dropped with it. A stream that never opens an object therefore grows the
//! buffer without bound; callers cap it through [`MessageFramer::pending_len`].

/// Incremental scanner state carried between reads.
#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    /// Next buffer offset to inspect.
    cursor: usize,
    /// Offset of the opening brace of the object being scanned.
    start: Option<usize>,
    depth: usize,
}

/// Accumulating buffer that yields complete JSON object frames.
#[derive(Debug, Default)]
pub struct MessageFramer {
    buffer: Vec<u8>,
    scan: ScanState,
}

impl MessageFramer {
    /// Creates an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends newly received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of bytes received but not yet consumed by a frame.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes received but not yet consumed by a frame.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Extracts the next complete object, if the buffer holds one.
    ///
    /// The returned frame is structurally balanced but not validated; callers
    /// decode it and report malformed content per frame. Returns `None` when
    /// only an incomplete object (or no object at all) remains.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let end = self.scan_to_frame_end()?;
        let start = self.scan.start.unwrap_or(0);
        let frame = self.buffer.get(start..=end).map(<[u8]>::to_vec);
        self.buffer.drain(..=end);
        self.scan = ScanState::default();
        frame
    }

    /// Extracts every complete object currently buffered, in order.
    pub fn drain_frames(&mut self) -> Vec<Vec<u8>> {
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Advances the scanner and returns the offset of the closing brace of
    /// the first complete object.
    fn scan_to_frame_end(&mut self) -> Option<usize> {
        let state = &mut self.scan;
        for (offset, &byte) in self.buffer.iter().enumerate().skip(state.cursor) {
            state.cursor = offset + 1;

            if state.start.is_none() {
                if byte == b'{' {
                    state.start = Some(offset);
                    state.depth = 1;
                }
                continue;
            }

            match byte {
                b'{' => state.depth += 1,
                b'}' => {
                    state.depth -= 1;
                    if state.depth == 0 {
                        return Some(offset);
                    }
                }
                _ => {}
            }
        }
        None
    }
}
