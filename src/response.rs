use std::collections::BTreeMap;

use crate::file::FileRef;
use crate::Error;

/// A received HTTP response.
///
/// The body is either held in memory or, for responses saved to a file,
/// read back from that file on demand.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    file: Option<FileRef>,
    primary_ip: Option<String>,
}

impl Response {
    /// Response with status and no headers or body.
    pub fn new(status: u16) -> Self {
        Response {
            status,
            headers: BTreeMap::new(),
            body: None,
            file: None,
            primary_ip: None,
        }
    }

    /// Response with status and headers.
    pub fn with_headers<I, K, V>(status: u16, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut r = Response::new(status);
        r.set_headers(headers);
        r
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Tell if the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Set a header. Names are lower-cased and a later set replaces an earlier one.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.set_header(k.as_ref(), v);
        }
    }

    /// All headers, keyed by lower-case name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn set_body(&mut self, body: Option<Vec<u8>>) {
        self.body = body;
    }

    /// The body.
    ///
    /// With a file attached, this reads the whole file.
    pub fn body(&self) -> Result<Option<Vec<u8>>, Error> {
        if let Some(file) = &self.file {
            return Ok(Some(file.read()?));
        }
        Ok(self.body.clone())
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Result<Option<String>, Error> {
        Ok(self
            .body()?
            .map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    /// Attach the file holding the body.
    pub fn set_file(&mut self, file: Option<FileRef>) {
        self.file = file;
    }

    pub fn file(&self) -> Option<&FileRef> {
        self.file.as_ref()
    }

    pub fn set_primary_ip(&mut self, ip: Option<String>) {
        self.primary_ip = ip;
    }

    /// Address of the remote end actually connected to, if reported.
    pub fn primary_ip(&self) -> Option<&str> {
        self.primary_ip.as_deref()
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new(200)
    }
}
