//! Blocking HTTP client with a pluggable transport.
//!
//! The crate has three layers:
//!
//! * A data model: [`Request`], [`Response`], [`Options`] and the [`File`]
//!   abstraction used for uploads and for saving response bodies.
//! * An [`Engine`], the [`Handler`] that maps a request and its options onto
//!   a [`Transport`][transport::Transport], and recovers status, headers and
//!   body from the raw bytes the transport hands back. The body is either
//!   collected in memory or streamed to a `save_as` file while it arrives.
//! * A [`Client`] holding default options, resolving relative urls against
//!   `base_uri` and optionally rejecting error statuses.
//!
//! The default transport is libcurl (feature `curl`, on by default).
//!
//! ```no_run
//! use http_handler::{Client, Options};
//!
//! let client = Client::new();
//!
//! let options = Options {
//!     timeout: Some(10),
//!     ..Default::default()
//! };
//!
//! let response = client.get("https://example.test/a?x=1", &options).unwrap();
//!
//! assert_eq!(response.status(), 200);
//! println!("{:?}", response.header("content-type"));
//! ```
//!
//! # Features
//!
//! * `curl` (default) - [`transport::curl::CurlTransport`], [`Engine::curl`]
//!   and [`Client::new`].
//! * `serde` - `Serialize`/`Deserialize` for [`Options`] and its parts, so
//!   defaults can be loaded from configuration files.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod client;
mod engine;
mod error;
mod file;
mod options;
mod request;
mod response;

pub mod framer;
pub mod query;
pub mod transport;

pub use client::{Client, ResponseError};
pub use engine::{Engine, Handler, FORCE_SPLIT_THRESHOLD};
pub use error::Error;
pub use file::{File, FileRef, LocalFile, MemoryFile};
pub use options::{Auth, Options, Proxy, ProxyType};
pub use query::Query;
pub use request::{Body, FieldValue, Fields, Request};
pub use response::Response;

pub use http;
