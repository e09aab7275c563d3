//! Default options, URL resolution and status handling on top of a [`Handler`].
//!
//! [`Client`] is the layer callers usually talk to. Each call:
//!
//! * merges the per-call [`Options`] over the client defaults
//! * builds the [`Request`] with [`Request::from_options`]
//! * waits out `delay`, if any
//! * fires the request on the handler
//! * turns status ≥ 400 into [`Error::Status`] when `http_errors` is on
//!
//! ```no_run
//! use http_handler::{Client, Options};
//!
//! let mut client = Client::new();
//! client.defaults_mut().base_uri = Some("https://api.example.test/v1".into());
//! client.defaults_mut().http_errors = Some(true);
//!
//! let response = client.get("users/7", &Options::default()).unwrap();
//! println!("{}", response.text().unwrap().unwrap_or_default());
//! ```

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::engine::Handler;
use crate::options::Options;
use crate::request::Request;
use crate::response::Response;
use crate::Error;

/// A response rejected because of its status code.
///
/// Carries both sides of the exchange.
pub struct ResponseError {
    request: Request,
    response: Response,
}

impl ResponseError {
    pub(crate) fn new(request: Request, response: Response) -> Self {
        ResponseError { request, response }
    }

    /// The request that was sent.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response received.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_parts(self) -> (Request, Response) {
        (self.request, self.response)
    }
}

impl fmt::Debug for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseError")
            .field("request", &self.request.to_string())
            .field("status", &self.response.status())
            .finish()
    }
}

/// Handler plus default options.
#[derive(Debug, Clone, Default)]
pub struct Client<H> {
    handler: H,
    defaults: Options,
}

#[cfg(feature = "curl")]
impl Client<crate::engine::Engine<crate::transport::curl::CurlTransport>> {
    /// Client using libcurl, with empty defaults.
    pub fn new() -> Self {
        Client::with_handler(crate::engine::Engine::curl())
    }
}

impl<H: Handler> Client<H> {
    pub fn with_handler(handler: H) -> Self {
        Client {
            handler,
            defaults: Options::default(),
        }
    }

    /// Replace the default options.
    pub fn with_defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut Options {
        &mut self.defaults
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Send `method` to `url`.
    ///
    /// `url` may be relative to the `base_uri` option.
    pub fn request(&self, method: &str, url: &str, options: &Options) -> Result<Response, Error> {
        let options = self.defaults.merge(options);
        let request = Request::from_options(method, url, &options)?;

        if let Some(ms) = options.delay.filter(|ms| *ms > 0) {
            debug!("Delay {} by {}ms", request, ms);
            thread::sleep(Duration::from_millis(ms));
        }

        let response = self.handler.fire(&request, &options)?;

        if options.http_errors == Some(true) && response.status() >= 400 {
            debug!("{} rejected with status {}", request, response.status());
            return Err(Error::Status(Box::new(ResponseError::new(
                request, response,
            ))));
        }

        Ok(response)
    }

    pub fn get(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("GET", url, options)
    }

    pub fn head(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("HEAD", url, options)
    }

    pub fn post(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("POST", url, options)
    }

    pub fn put(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("PUT", url, options)
    }

    pub fn patch(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("PATCH", url, options)
    }

    pub fn delete(&self, url: &str, options: &Options) -> Result<Response, Error> {
        self.request("DELETE", url, options)
    }
}
