//! The native network engine the [`Engine`][crate::Engine] drives.
//!
//! The engine lowers a [`Request`][crate::Request] plus
//! [`Options`][crate::Options] into a [`TransportRequest`], a flat set of
//! transport level settings. The transport performs the exchange and pushes
//! every received byte, status lines and headers included, into a
//! [`ResponseSink`] in arrival order.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::options::ProxyType;
use crate::Error;

#[cfg(feature = "curl")]
pub mod curl;

/// Receiver of raw response bytes.
///
/// Called synchronously from the transport's read loop, once per chunk.
pub trait ResponseSink {
    /// Take a chunk. Returns how many bytes were consumed; anything short of
    /// `data.len()` makes the transport abort the transfer.
    fn write(&mut self, data: &[u8]) -> usize;
}

/// A native HTTP engine.
pub trait Transport {
    /// Perform one exchange.
    ///
    /// Fails with [`Error::TransportInit`] if the engine cannot be set up for
    /// the request, and [`Error::Transport`] for anything going wrong on the
    /// wire.
    fn perform(
        &self,
        request: TransportRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransportInfo, Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(
        &self,
        request: TransportRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransportInfo, Error> {
        (**self).perform(request, sink)
    }
}

/// What the transport reports after a completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportInfo {
    /// Status code of the final response.
    pub status: u16,
    /// Remote address actually connected to.
    pub primary_ip: Option<String>,
}

/// Transport level settings for one exchange.
#[derive(Debug, Default)]
pub struct TransportRequest {
    pub url: String,
    /// Explicit method, for anything but `GET`.
    pub custom_method: Option<String>,
    /// Do not ask for a response body (`HEAD`).
    pub no_body: bool,
    pub body: TransportBody,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    /// Read and write cookies from and to this file.
    pub cookie_jar: Option<PathBuf>,
    /// Verify peer and host name.
    pub ssl_verify: Option<bool>,
    pub proxy: Option<TransportProxy>,
    /// Local interface or address to bind.
    pub interface: Option<String>,
    /// `Name: value` lines.
    pub headers: Vec<String>,
    /// `host:port:address` resolve override.
    pub resolve: Option<String>,
    pub verbose: bool,
}

/// Request body in transport terms.
#[derive(Default)]
pub enum TransportBody {
    #[default]
    None,
    /// Sent as is.
    Bytes(Vec<u8>),
    /// `multipart/form-data`.
    Form(Vec<FormPart>),
    /// Streamed from `reader`, which yields exactly `size` bytes.
    Upload {
        reader: Box<dyn Read + Send>,
        size: u64,
    },
}

impl fmt::Debug for TransportBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bytes(v) => write!(f, "Bytes({})", v.len()),
            Self::Form(v) => f.debug_tuple("Form").field(v).finish(),
            Self::Upload { size, .. } => write!(f, "Upload({})", size),
        }
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// Content of a form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// Read from `path` by the transport.
    File { path: PathBuf, filename: String },
}

/// Proxy in transport terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportProxy {
    pub kind: ProxyType,
    /// `host:port`
    pub address: String,
    pub credentials: Option<(String, String)>,
}
