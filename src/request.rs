use std::collections::BTreeMap;
use std::fmt;

use http::{Method, Uri};

use crate::file::FileRef;
use crate::options::{Options, Proxy};
use crate::query::{self, Query};
use crate::Error;

/// Form fields of a [`Body::Fields`].
pub type Fields = BTreeMap<String, FieldValue>;

/// A single form field value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    /// Uploaded as a file part, by reference.
    File(FileRef),
    /// Sent as `outer[inner]` fields.
    Nested(Fields),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}

impl From<Fields> for FieldValue {
    fn from(value: Fields) -> Self {
        FieldValue::Nested(value)
    }
}

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Raw(Vec<u8>),
    Fields(Fields),
    /// Streamed from a local file.
    FileUpload(FileRef),
}

impl Body {
    /// Tell if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Raw(value.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Raw(value.into_bytes())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Raw(value)
    }
}

impl From<Fields> for Body {
    fn from(value: Fields) -> Self {
        Body::Fields(value)
    }
}

impl From<FileRef> for Body {
    fn from(value: FileRef) -> Self {
        Body::FileUpload(value)
    }
}

/// Description of an outgoing HTTP request.
///
/// Built once per call, mutated via setters and handed to a
/// [`Handler`][crate::Handler].
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    scheme: String,
    host: String,
    port: Option<u16>,
    ip: Option<String>,
    uri: String,
    query: Query,
    headers: BTreeMap<String, String>,
    body: Body,
    proxy: Option<Proxy>,
    save_as: Option<FileRef>,
    outgoing_ip: Option<String>,
}

impl Request {
    /// New `GET` request for `http://<host>/<uri>`.
    pub fn new(host: impl Into<String>, uri: &str) -> Self {
        let mut r = Request {
            method: Method::GET.as_str().to_string(),
            scheme: "http".to_string(),
            host: host.into(),
            port: None,
            ip: None,
            uri: String::new(),
            query: Query::new(),
            headers: BTreeMap::new(),
            body: Body::Empty,
            proxy: None,
            save_as: None,
            outgoing_ip: None,
        };
        r.set_uri(uri);
        r
    }

    /// Parse an absolute url into a request.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| Error::UrlParse(format!("{}: {}", url, e)))?;

        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::UrlParse(format!("no host in url: {}", url)))?;

        let mut request = Request::new(host, uri.path());

        if let Some(scheme) = uri.scheme_str() {
            request.set_scheme(scheme);
        }
        request.set_port(uri.port_u16());
        if let Some(q) = uri.query() {
            request.set_query(query::parse(q));
        }

        Ok(request)
    }

    /// Build a request from method, url and options.
    ///
    /// Relative urls are resolved against `options.base_uri`.
    pub fn from_options(method: &str, url: &str, options: &Options) -> Result<Self, Error> {
        let url = build_url(url, options)?;
        let mut request = Request::from_url(&url)?;

        request.set_method(method)?;

        if let Some(body) = &options.body {
            request.set_body(body.clone());
        } else if let Some(fields) = &options.form_params {
            request.set_body(Body::Fields(fields.clone()));
        }
        if let Some(headers) = &options.headers {
            request.set_headers(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(proxy) = &options.proxy {
            request.set_proxy(Some(proxy.clone()));
        }
        if let Some(file) = &options.save_as {
            request.save_as(Some(file.clone()));
        }
        if let Some(ip) = &options.outgoing_ip {
            request.set_outgoing_ip(Some(ip.clone()));
        }
        if let Some(q) = &options.query {
            request
                .query
                .extend(q.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(request)
    }

    /// Render `scheme://host[:port]/uri[?query]`.
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);
        if let Some(port) = self.port {
            url.push_str(&format!(":{}", port));
        }
        url.push('/');
        url.push_str(&self.uri);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&query::serialize(&self.query));
        }
        url
    }

    /// Set the method. It is stored upper-cased.
    pub fn set_method(&mut self, method: &str) -> Result<(), Error> {
        let upper = method.to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes()).map_err(|_| Error::BadMethod(method.to_string()))?;
        self.method = upper;
        Ok(())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_scheme(&mut self, scheme: &str) {
        self.scheme = scheme.to_ascii_lowercase();
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Port to connect to, falling back on the scheme default.
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.scheme == "https" { 443 } else { 80 })
    }

    /// Pin the address `host` resolves to.
    pub fn set_ip(&mut self, ip: Option<String>) {
        self.ip = ip;
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Set the path. Leading slashes are dropped.
    pub fn set_uri(&mut self, uri: &str) {
        self.uri = uri.trim_start_matches('/').to_string();
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = query;
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Set a header, or remove it with `None`.
    pub fn set_header(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match value {
            Some(v) => {
                self.headers.insert(name, v);
            }
            None => {
                self.headers.remove(&name);
            }
        }
    }

    /// Header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }

    /// Set several headers, keeping the ones not mentioned.
    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.set_header(k, Some(v.into()));
        }
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn set_referer(&mut self, referer: Option<String>) {
        self.set_header("Referer", referer);
    }

    pub fn referer(&self) -> Option<&str> {
        self.header("Referer")
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_proxy(&mut self, proxy: Option<Proxy>) {
        self.proxy = proxy;
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    /// Stream the response body to `file`.
    pub fn save_as(&mut self, file: Option<FileRef>) {
        self.save_as = file;
    }

    pub fn save_as_file(&self) -> Option<&FileRef> {
        self.save_as.as_ref()
    }

    pub fn set_outgoing_ip(&mut self, outgoing_ip: Option<String>) {
        self.outgoing_ip = outgoing_ip;
    }

    pub fn outgoing_ip(&self) -> Option<&str> {
        self.outgoing_ip.as_deref()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url())
    }
}

fn build_url(url: &str, options: &Options) -> Result<String, Error> {
    if has_scheme(url) {
        return Ok(url.to_string());
    }

    let Some(base) = &options.base_uri else {
        return Err(Error::Config(format!(
            "base_uri is required for relative url: {}",
            url
        )));
    };

    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    ))
}

// [a-z]+://
fn has_scheme(url: &str) -> bool {
    match url.find("://") {
        Some(0) | None => false,
        Some(n) => url[..n].bytes().all(|c| c.is_ascii_alphabetic()),
    }
}
