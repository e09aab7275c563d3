//! Executing requests over a transport.
//!
//! [`Engine`] turns one [`Request`] plus one [`Options`] into one
//! [`Response`]:
//!
//! * **Prepare** - map the request and options onto a
//!   [`TransportRequest`][crate::transport::TransportRequest]
//! * **Perform** - the transport runs the exchange and pushes the raw
//!   response, header blocks included, into a sink
//! * **Frame** - header blocks are separated from the payload with
//!   [`framer::split`]
//! * **Assemble** - status, headers, remote address and body (or body file)
//!   become a [`Response`]
//!
//! There are two sinks. Without `save_as` the whole response is collected in
//! memory and split once at the end. With `save_as` the body is streamed to
//! the destination while it arrives:
//!
//! ```text
//!          chunk                       chunk
//!            │                           │
//!            ▼                           ▼
//!  ┌──────────────────┐  split   ┌──────────────────┐
//!  │  AwaitingHeader  │─────────▶│    Streaming     │──▶ destination
//!  └──────────────────┘          └──────────────────┘
//!   blank line found (only without redirects and proxy),
//!   or more than 10 KiB buffered, or end of stream
//! ```
//!
//! # Example
//!
//! ```no_run
//! use http_handler::{Engine, Handler, Options, Request};
//!
//! let engine = Engine::curl();
//! let request = Request::from_url("https://example.test/a?x=1").unwrap();
//!
//! let options = Options {
//!     timeout: Some(10),
//!     allow_redirects: Some(true),
//!     ..Default::default()
//! };
//!
//! let response = engine.fire(&request, &options).unwrap();
//! println!("{} {:?}", response.status(), response.header("content-type"));
//! ```

use crate::file::FileRef;
use crate::framer;
use crate::options::Options;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{Transport, TransportInfo};
use crate::Error;

mod prepare;
mod sink;

pub use sink::FORCE_SPLIT_THRESHOLD;

use sink::{CollectSink, SaveSink};

#[cfg(test)]
mod test;

/// Something that executes requests.
pub trait Handler {
    /// Execute `request` under `options`, blocking until the exchange is done.
    fn fire(&self, request: &Request, options: &Options) -> Result<Response, Error>;
}

impl<H: Handler + ?Sized> Handler for &H {
    fn fire(&self, request: &Request, options: &Options) -> Result<Response, Error> {
        (**self).fire(request, options)
    }
}

/// [`Handler`] driving a [`Transport`].
///
/// Holds no per-call state. Buffers, file handles and parse state live for
/// the duration of one [`fire`][Handler::fire].
#[derive(Debug, Default, Clone)]
pub struct Engine<T> {
    transport: T,
}

impl<T: Transport> Engine<T> {
    /// Engine on top of `transport`.
    pub fn new(transport: T) -> Self {
        Engine { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn fire_buffered(&self, request: &Request, options: &Options) -> Result<Response, Error> {
        let prepared = prepare::prepare(request, options)?;

        let mut sink = CollectSink::new();
        let info = self.transport.perform(prepared, &mut sink)?;

        let (header, body) = sink.finish();

        let mut response = assemble(&header, info);
        response.set_body(Some(body));

        Ok(response)
    }

    fn fire_streaming(
        &self,
        request: &Request,
        options: &Options,
        save_as: &FileRef,
    ) -> Result<Response, Error> {
        let prepared = prepare::prepare(request, options)?;

        let out = save_as.open_write().map_err(|e| {
            Error::Io(format!("cannot open {} for write: {}", save_as.location(), e))
        })?;

        // With redirects or a proxy in play, more header blocks may follow the
        // first blank line. Only the size threshold ends the wait then.
        let check_separator = options.allow_redirects.is_none() && no_proxy(request, options);

        debug!(
            "Streaming to {} (separator check: {})",
            save_as.location(),
            check_separator
        );

        let mut sink = SaveSink::new(out, check_separator);
        let outcome = self.transport.perform(prepared, &mut sink);

        // finish() flushes and closes the destination, also when the
        // transport failed. A failed write takes precedence.
        let header = sink.finish();

        let info = match outcome {
            Ok(v) => v,
            Err(e) => {
                header?;
                return Err(e);
            }
        };
        let header = header?;

        let mut response = assemble(&header, info);
        response.set_file(Some(save_as.clone()));

        Ok(response)
    }
}

#[cfg(feature = "curl")]
impl Engine<crate::transport::curl::CurlTransport> {
    /// Engine using libcurl.
    pub fn curl() -> Self {
        Engine::new(crate::transport::curl::CurlTransport::new())
    }
}

impl<T: Transport> Handler for Engine<T> {
    fn fire(&self, request: &Request, options: &Options) -> Result<Response, Error> {
        debug!("Fire {}", request);

        let save_as = options.save_as.as_ref().or(request.save_as_file());

        let result = match save_as {
            Some(file) => self.fire_streaming(request, options, file),
            None => self.fire_buffered(request, options),
        };

        match &result {
            Ok(r) => debug!("{} -> {}", request, r.status()),
            Err(e) => debug!("{} failed: {}", request, e),
        }

        result
    }
}

/// True when there is no proxy for this call.
fn no_proxy(request: &Request, options: &Options) -> bool {
    options.proxy.is_none() && request.proxy().is_none()
}

fn assemble(header: &[u8], info: TransportInfo) -> Response {
    let mut response = Response::with_headers(info.status, framer::decode_header(header));
    response.set_primary_ip(info.primary_ip);
    response
}
