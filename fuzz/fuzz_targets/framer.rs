#![no_main]

use std::sync::Arc;

use http_handler::framer;
use http_handler::transport::{ResponseSink, Transport, TransportInfo, TransportRequest};
use http_handler::{Engine, Error, Handler, MemoryFile, Options, Request, FORCE_SPLIT_THRESHOLD};
use libfuzzer_sys::fuzz_target;

// Prefixes to make it likely the input gets past the status line check.
const PREFIXES: &[&[u8]] = &[
    b"",
    b"HTTP/1.1 200 OK\r\n",
    b"HTTP/1.1 301 Moved\r\nLocation: /b\r\n\r\nHTTP/1.1 200 OK\r\n",
    b"HTTP/1.1 200 Connection established\r\n\r\n",
];

/// Replays `raw` in pieces of `size`.
struct Replay {
    raw: Vec<u8>,
    size: usize,
}

impl Transport for Replay {
    fn perform(
        &self,
        _request: TransportRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransportInfo, Error> {
        for chunk in self.raw.chunks(self.size) {
            if sink.write(chunk) != chunk.len() {
                return Err(Error::Transport {
                    code: 23,
                    message: "short write".into(),
                });
            }
        }
        Ok(TransportInfo::default())
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let prefix = PREFIXES[(data[0] as usize) % PREFIXES.len()];
    let size = (data[1] as usize) + 1;
    let redirects = data[2] % 2 == 0;

    let mut raw = prefix.to_vec();
    raw.extend_from_slice(&data[3..]);

    // ********************************** Framer

    let (header, rest) = framer::split(&raw);

    if header.is_empty() {
        assert_eq!(rest, &raw[..]);
    } else {
        assert_eq!(header.len() + framer::SEPARATOR.len() + rest.len(), raw.len());
        assert!(raw.starts_with(header));
        assert!(framer::is_status_line(header));
    }

    // Must not panic on arbitrary input.
    let _ = framer::decode_header(header);
    let _ = framer::final_status(header);

    // ********************************** Buffered

    let request = Request::new("example.test", "/");

    let buffered = Engine::new(Replay {
        raw: raw.clone(),
        size,
    });
    let response = buffered.fire(&request, &Options::default()).unwrap();
    let body = response.body().unwrap().unwrap();
    assert_eq!(body, rest);

    // ********************************** Streaming

    let file = MemoryFile::new("fuzz");
    let options = Options {
        save_as: Some(Arc::new(file.clone())),
        allow_redirects: redirects.then_some(true),
        ..Default::default()
    };

    let streaming = Engine::new(Replay { raw: raw.clone(), size });
    streaming.fire(&request, &options).unwrap();

    // Without the early split, and below the forced split, streaming sees the
    // whole response at once and must agree with the buffered result.
    if redirects && raw.len() <= FORCE_SPLIT_THRESHOLD {
        assert_eq!(file.contents(), body);
    }
});
