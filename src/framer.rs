//! Separating header blocks from payload in a raw response byte stream.
//!
//! A transport asked to include headers in its output hands back the status
//! line, headers and body as one stream of bytes:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! hello
//! ```
//!
//! When the transport follows redirects, or tunnels through a proxy with
//! `CONNECT`, each hop contributes its own status line and headers before the
//! final payload:
//!
//! ```text
//! HTTP/1.1 200 Connection established\r\n
//! \r\n
//! HTTP/1.1 302 Found\r\n
//! Location: /b\r\n
//! \r\n
//! HTTP/1.1 200 OK\r\n
//! \r\n
//! hello
//! ```
//!
//! [`split`] peels all such blocks off the front and returns them as one
//! header portion, leaving only the payload.
//!
//! # Example
//!
//! ```
//! use http_handler::framer;
//!
//! let raw = b"HTTP/1.1 301 Moved\r\nLocation: /b\r\n\r\n\
//!             HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n\
//!             hello";
//!
//! let (header, body) = framer::split(raw);
//! assert_eq!(body, b"hello");
//!
//! let headers = framer::decode_header(header);
//! assert_eq!(headers, vec![("Content-Type".to_string(), "text/plain".to_string())]);
//! ```

/// Blank line ending a header block.
pub const SEPARATOR: &[u8] = b"\r\n\r\n";

/// Line terminator inside a header block.
pub const CRLF: &[u8] = b"\r\n";

/// Upper bound on header blocks peeled by [`split`]. Anything after is payload.
pub const MAX_HEADER_BLOCKS: usize = 32;

/// Split `buf` into `(header, remainder)`.
///
/// If `buf` does not start with a status line, or holds no blank-line
/// separator, the whole of it is payload and `header` is empty.
///
/// Otherwise `header` runs from the first status line up to (not including)
/// the separator ending the last consecutive header block, and `remainder`
/// is everything after that separator. A following block is only peeled if it
/// also starts with a status line and is complete.
pub fn split(buf: &[u8]) -> (&[u8], &[u8]) {
    if !is_status_line(buf) {
        return (&[], buf);
    }
    let Some(mut end) = find(buf, SEPARATOR) else {
        return (&[], buf);
    };

    let mut blocks = 1;

    while blocks < MAX_HEADER_BLOCKS {
        let rest = &buf[end + SEPARATOR.len()..];

        if !is_status_line(rest) {
            break;
        }
        let Some(n) = find(rest, SEPARATOR) else {
            break;
        };

        end += SEPARATOR.len() + n;
        blocks += 1;
    }

    if blocks == MAX_HEADER_BLOCKS {
        debug!("Stopped peeling header blocks at {}", MAX_HEADER_BLOCKS);
    }

    (&buf[..end], &buf[end + SEPARATOR.len()..])
}

/// Tell if `buf` holds a blank-line separator.
pub fn has_separator(buf: &[u8]) -> bool {
    find(buf, SEPARATOR).is_some()
}

/// Tell if `buf` starts with something like `HTTP/1.1 200`.
///
/// The version is one digit with an optional `.digit` minor, and the
/// `HTTP` prefix is matched case-insensitively.
pub fn is_status_line(buf: &[u8]) -> bool {
    const PREFIX: &[u8] = b"HTTP/";

    if buf.len() < PREFIX.len() || !buf[..PREFIX.len()].eq_ignore_ascii_case(PREFIX) {
        return false;
    }

    let mut rest = &buf[PREFIX.len()..];

    // major
    match rest.first() {
        Some(c) if c.is_ascii_digit() => rest = &rest[1..],
        _ => return false,
    }

    // .minor
    if rest.first() == Some(&b'.') {
        match rest.get(1) {
            Some(c) if c.is_ascii_digit() => rest = &rest[2..],
            _ => return false,
        }
    }

    rest.first() == Some(&b' ') && rest.get(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
}

/// Decode the header lines of the final block in `header`.
///
/// The status line is skipped. Each line is split on its first colon and the
/// value left-trimmed. A line without colon becomes a name with empty value.
/// Names keep their case and duplicates are all returned in order.
pub fn decode_header(header: &[u8]) -> Vec<(String, String)> {
    let last = match rfind(header, SEPARATOR) {
        Some(n) => &header[n + SEPARATOR.len()..],
        None => header,
    };

    let mut out = Vec::new();

    for line in Lines(last).skip(1) {
        if line.is_empty() {
            continue;
        }

        let line = String::from_utf8_lossy(line);

        let (name, value) = match line.split_once(':') {
            Some((n, v)) => (n, v.trim_start()),
            None => (&*line, ""),
        };

        out.push((name.to_string(), value.to_string()));
    }

    out
}

/// Status code from the final block in `header`, if it has one.
pub fn final_status(header: &[u8]) -> Option<u16> {
    let last = match rfind(header, SEPARATOR) {
        Some(n) => &header[n + SEPARATOR.len()..],
        None => header,
    };

    if !is_status_line(last) {
        return None;
    }

    let line = Lines(last).next()?;
    let code = line.split(|c| *c == b' ').nth(1)?;

    std::str::from_utf8(code).ok()?.parse().ok()
}

/// Split on CRLF.
struct Lines<'a>(&'a [u8]);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }
        match find(self.0, CRLF) {
            Some(n) => {
                let line = &self.0[..n];
                self.0 = &self.0[n + CRLF.len()..];
                Some(line)
            }
            None => {
                let line = self.0;
                self.0 = &[];
                Some(line)
            }
        }
    }
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
