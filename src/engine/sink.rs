use std::io::{self, Write};

use crate::framer;
use crate::transport::ResponseSink;
use crate::Error;

/// Accumulator size after which the header split is forced.
pub const FORCE_SPLIT_THRESHOLD: usize = 10 * 1024;

/// Buffers the entire raw response in memory.
#[derive(Debug, Default)]
pub(crate) struct CollectSink {
    buf: Vec<u8>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the collected bytes into raw header block and body.
    pub fn finish(self) -> (Vec<u8>, Vec<u8>) {
        let (header, body) = framer::split(&self.buf);
        (header.to_vec(), body.to_vec())
    }
}

impl ResponseSink for CollectSink {
    fn write(&mut self, data: &[u8]) -> usize {
        trace!("Collect {} bytes", data.len());
        self.buf.extend_from_slice(data);
        data.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveState {
    AwaitingHeader,
    Streaming,
}

/// Streams the response body to a writer, stripping header blocks.
///
/// While `AwaitingHeader`, chunks go to an accumulator. The accumulator is
/// split with [`framer::split`] either when a separator shows up (only when
/// `check_separator` is on), or when it grows past
/// [`FORCE_SPLIT_THRESHOLD`]. From then on, in `Streaming`, chunks are written
/// straight through.
pub(crate) struct SaveSink {
    out: Box<dyn Write + Send>,
    state: SaveState,
    check_separator: bool,
    pending: Vec<u8>,
    header: Vec<u8>,
    error: Option<io::Error>,
}

impl SaveSink {
    /// `check_separator` enables the early split on the first blank line.
    pub fn new(out: Box<dyn Write + Send>, check_separator: bool) -> Self {
        SaveSink {
            out,
            state: SaveState::AwaitingHeader,
            check_separator,
            pending: Vec::new(),
            header: Vec::new(),
            error: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SaveState {
        self.state
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Move header bytes out of the accumulator and start streaming.
    fn split_pending(&mut self) {
        let (header, rest) = framer::split(&self.pending);
        self.header.extend_from_slice(header);
        self.pending = rest.to_vec();
        self.state = SaveState::Streaming;
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.out.write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }

    fn accept(&mut self, data: &[u8]) -> io::Result<()> {
        if self.state == SaveState::Streaming {
            return self.out.write_all(data);
        }

        self.pending.extend_from_slice(data);

        if self.check_separator && framer::has_separator(&self.pending) {
            debug!("Header separator found after {} bytes", self.pending.len());
            self.split_pending();
        }

        if self.state == SaveState::AwaitingHeader && self.pending.len() > FORCE_SPLIT_THRESHOLD {
            debug!("Forcing header split at {} bytes", self.pending.len());
            self.split_pending();
        }

        if self.state == SaveState::Streaming {
            self.flush_pending()?;
        }

        Ok(())
    }

    /// End of stream. Splits anything still pending, flushes and closes the
    /// writer, and returns the raw header block.
    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }

        if self.state == SaveState::AwaitingHeader && !self.pending.is_empty() {
            self.split_pending();
        }

        self.flush_pending()?;
        self.out.flush()?;

        Ok(self.header)
    }
}

impl ResponseSink for SaveSink {
    fn write(&mut self, data: &[u8]) -> usize {
        if self.error.is_some() {
            return 0;
        }

        trace!("Save {} bytes ({:?})", data.len(), self.state);

        match self.accept(data) {
            Ok(()) => data.len(),
            Err(e) => {
                debug!("Write to destination failed: {}", e);
                self.error = Some(e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{File, MemoryFile};

    const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello";

    fn save_sink(check_separator: bool) -> (SaveSink, MemoryFile) {
        let file = MemoryFile::new("out");
        let sink = SaveSink::new(file.open_write().unwrap(), check_separator);
        (sink, file)
    }

    #[test]
    fn collect_splits_once() {
        let mut sink = CollectSink::new();
        assert_eq!(sink.write(&RESPONSE[..10]), 10);
        assert_eq!(sink.write(&RESPONSE[10..]), RESPONSE.len() - 10);
        let (header, body) = sink.finish();
        assert_eq!(header, b"HTTP/1.1 200 OK\r\nContent-Type: text/plain");
        assert_eq!(body, b"hello");
    }

    #[test]
    fn save_every_partition_of_two() {
        for i in 0..=RESPONSE.len() {
            for check in [true, false] {
                let (mut sink, file) = save_sink(check);
                assert_eq!(sink.write(&RESPONSE[..i]), i);
                assert_eq!(sink.write(&RESPONSE[i..]), RESPONSE.len() - i);
                let header = sink.finish().unwrap();
                assert_eq!(file.contents(), b"hello", "split at {} check {}", i, check);
                assert_eq!(header, b"HTTP/1.1 200 OK\r\nContent-Type: text/plain");
            }
        }
    }

    #[test]
    fn save_byte_by_byte() {
        let (mut sink, file) = save_sink(true);
        for b in RESPONSE {
            assert_eq!(sink.write(&[*b]), 1);
        }
        sink.finish().unwrap();
        assert_eq!(file.contents(), b"hello");
    }

    #[test]
    fn save_transitions_on_separator() {
        let (mut sink, file) = save_sink(true);
        sink.write(b"HTTP/1.1 200 OK\r\n\r\nab");
        assert_eq!(sink.state(), SaveState::Streaming);
        assert_eq!(sink.pending_len(), 0);
        sink.write(b"cd");
        sink.finish().unwrap();
        assert_eq!(file.contents(), b"abcd");
    }

    #[test]
    fn save_without_check_waits_for_end() {
        let (mut sink, file) = save_sink(false);
        sink.write(b"HTTP/1.1 200 OK\r\n\r\nab");
        assert_eq!(sink.state(), SaveState::AwaitingHeader);
        assert!(file.contents().is_empty());
        sink.finish().unwrap();
        assert_eq!(file.contents(), b"ab");
    }

    #[test]
    fn save_redirect_chain_without_check() {
        let input = b"HTTP/1.1 302 Found\r\nLocation: /b\r\n\r\n\
            HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabc";
        let (mut sink, file) = save_sink(false);
        for c in input.chunks(7) {
            sink.write(c);
        }
        let header = sink.finish().unwrap();
        assert_eq!(file.contents(), b"abc");
        assert_eq!(framer::final_status(&header), Some(200));
    }

    #[test]
    fn save_forced_split_bounds_accumulator() {
        let mut input = b"HTTP/1.1 200 OK\r\n".to_vec();
        input.extend_from_slice(b"X-Big: ");
        input.extend(std::iter::repeat(b'a').take(FORCE_SPLIT_THRESHOLD));
        input.extend_from_slice(b"\r\n\r\nbody");

        let (mut sink, file) = save_sink(false);
        for c in input.chunks(1000) {
            sink.write(c);
            assert!(sink.pending_len() <= FORCE_SPLIT_THRESHOLD + 1000);
        }
        assert_eq!(sink.state(), SaveState::Streaming);

        // Nothing more comes in, the accumulator stays empty.
        sink.write(b" more");
        assert_eq!(sink.pending_len(), 0);

        sink.finish().unwrap();
        assert_eq!(file.contents(), b"body more");
    }

    #[test]
    fn save_forced_split_without_boundary_is_payload() {
        let input = vec![b'z'; FORCE_SPLIT_THRESHOLD + 1];
        let (mut sink, file) = save_sink(true);
        sink.write(&input);
        assert_eq!(sink.state(), SaveState::Streaming);
        let header = sink.finish().unwrap();
        assert!(header.is_empty());
        assert_eq!(file.contents(), input);
    }

    #[test]
    fn save_body_only_stream() {
        let (mut sink, file) = save_sink(true);
        sink.write(b"no headers at all");
        let header = sink.finish().unwrap();
        assert!(header.is_empty());
        assert_eq!(file.contents(), b"no headers at all");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn save_write_error_refuses_data() {
        let mut sink = SaveSink::new(Box::new(FailingWriter), true);
        assert_eq!(sink.write(b"HTTP/1.1 200 OK\r\n\r\nab"), 0);
        assert_eq!(sink.write(b"cd"), 0);
        let err = sink.finish().unwrap_err();
        assert!(matches!(err, Error::Io(m) if m == "disk full"));
    }
}
