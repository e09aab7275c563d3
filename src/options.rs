//! Per-call options.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;

use crate::file::FileRef;
use crate::query::Query;
use crate::request::{Body, Fields};

/// Options bag for a single call.
///
/// Every key is optional and "unset" is distinct from any value. An absent
/// key leaves the transport default in place.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Prefix for relative urls given to [`Request::from_options`][crate::Request::from_options].
    pub base_uri: Option<String>,
    /// Whether the transport follows redirects.
    pub allow_redirects: Option<bool>,
    /// Credentials sent as `Authorization` header.
    pub auth: Option<Auth>,
    /// Connect timeout in seconds. Ignored unless positive.
    pub connect_timeout: Option<u64>,
    /// Total timeout in seconds. Ignored unless positive.
    pub timeout: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
    pub proxy: Option<Proxy>,
    /// Verify both peer certificate and host name.
    pub ssl_verify: Option<bool>,
    /// Cookie file, used both to read and write cookies.
    pub cookies: Option<PathBuf>,
    /// Stream the response body into this file.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub save_as: Option<FileRef>,
    /// Local interface or address to send from.
    pub outgoing_ip: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub body: Option<Body>,
    /// Form fields, used as body when `body` is not set.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub form_params: Option<Fields>,
    /// Merged over the query of the url.
    pub query: Option<Query>,
    /// Treat statuses >= 400 as errors in [`Client`][crate::Client].
    pub http_errors: Option<bool>,
    /// Milliseconds to wait before sending.
    pub delay: Option<u64>,
    /// Transport verbose output.
    pub debug: Option<bool>,
}

impl Options {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Keys set in `overrides` win. Headers are merged name by name.
    pub fn merge(&self, overrides: &Options) -> Options {
        macro_rules! pick {
            ($f:ident) => {
                overrides.$f.clone().or_else(|| self.$f.clone())
            };
        }

        let headers = match (&self.headers, &overrides.headers) {
            (Some(a), Some(b)) => {
                let mut merged = a.clone();
                merged.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(merged)
            }
            (a, b) => b.clone().or_else(|| a.clone()),
        };

        Options {
            base_uri: pick!(base_uri),
            allow_redirects: pick!(allow_redirects),
            auth: pick!(auth),
            connect_timeout: pick!(connect_timeout),
            timeout: pick!(timeout),
            headers,
            proxy: pick!(proxy),
            ssl_verify: pick!(ssl_verify),
            cookies: pick!(cookies),
            save_as: pick!(save_as),
            outgoing_ip: pick!(outgoing_ip),
            body: pick!(body),
            form_params: pick!(form_params),
            query: pick!(query),
            http_errors: pick!(http_errors),
            delay: pick!(delay),
            debug: pick!(debug),
        }
    }
}

/// Proxy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        };
        write!(f, "{}", s)
    }
}

/// Proxy to tunnel the request through.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proxy {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ProxyType,
    pub hostname: String,
    pub port: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub username: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub password: Option<String>,
}

impl Proxy {
    /// Proxy without credentials.
    pub fn new(kind: ProxyType, hostname: impl Into<String>, port: u16) -> Self {
        Proxy {
            kind,
            hostname: hostname.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// `hostname:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Username and password, only if the username is non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some((username, self.password.as_deref().unwrap_or("")))
    }
}

/// Request authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Auth {
    /// HTTP basic authentication.
    Basic { username: String, password: String },
    /// Verbatim `Authorization` header value.
    Header(String),
}

impl Auth {
    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic { username, password } => {
                let creds = format!("{}:{}", username, password);
                format!("Basic {}", BASE64_STANDARD.encode(creds))
            }
            Auth::Header(v) => v.clone(),
        }
    }
}
