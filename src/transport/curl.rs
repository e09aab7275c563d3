//! libcurl transport.

use std::io::Read;

use curl::easy::{Easy, Form, List, ProxyType as CurlProxyType, ReadError};

use crate::options::ProxyType;
use crate::Error;

use super::{FormValue, ResponseSink, Transport, TransportBody, TransportInfo, TransportRequest};

/// Transport running each exchange on a fresh libcurl easy handle.
///
/// Nothing is shared between calls, so one `CurlTransport` can serve
/// concurrent callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurlTransport {
    _priv: (),
}

impl CurlTransport {
    /// Create the transport.
    pub fn new() -> Self {
        CurlTransport { _priv: () }
    }
}

impl Transport for CurlTransport {
    fn perform(
        &self,
        request: TransportRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransportInfo, Error> {
        let TransportRequest {
            url,
            custom_method,
            no_body,
            body,
            timeout,
            connect_timeout,
            follow_redirects,
            cookie_jar,
            ssl_verify,
            proxy,
            interface,
            headers,
            resolve,
            verbose,
        } = request;

        let mut easy = Easy::new();

        easy.url(&url)
            .map_err(|e| Error::TransportInit(format!("{}: {}", url, e)))?;

        // Status lines and headers go to the sink together with the body.
        easy.show_header(true)?;

        if let Some(method) = &custom_method {
            easy.custom_request(method)?;
        }
        if no_body {
            easy.nobody(true)?;
        }

        let mut upload: Option<Box<dyn Read + Send>> = None;

        match body {
            TransportBody::None => {}
            TransportBody::Bytes(bytes) => {
                easy.post_fields_copy(&bytes)?;
            }
            TransportBody::Form(parts) => {
                let mut form = Form::new();
                for part in &parts {
                    match &part.value {
                        FormValue::Text(text) => {
                            form.part(&part.name).contents(text.as_bytes()).add()?;
                        }
                        FormValue::File { path, filename } => {
                            form.part(&part.name)
                                .file(path)
                                .filename(filename.as_str())
                                .add()?;
                        }
                    }
                }
                easy.httppost(form)?;
            }
            TransportBody::Upload { reader, size } => {
                easy.upload(true)?;
                easy.in_filesize(size)?;
                upload = Some(reader);
            }
        }

        if let Some(t) = timeout {
            easy.timeout(t)?;
        }
        if let Some(t) = connect_timeout {
            easy.connect_timeout(t)?;
        }
        if let Some(follow) = follow_redirects {
            easy.follow_location(follow)?;
        }
        if let Some(path) = &cookie_jar {
            easy.cookie_file(path)?;
            easy.cookie_jar(path)?;
        }
        if let Some(verify) = ssl_verify {
            easy.ssl_verify_peer(verify)?;
            easy.ssl_verify_host(verify)?;
        }
        if let Some(proxy) = &proxy {
            match proxy.kind {
                ProxyType::Socks4 => easy.proxy_type(CurlProxyType::Socks4)?,
                ProxyType::Socks5 => easy.proxy_type(CurlProxyType::Socks5)?,
                ProxyType::Http | ProxyType::Https => {}
            }
            easy.proxy(&proxy.address)?;
            if let Some((username, password)) = &proxy.credentials {
                easy.proxy_username(username)?;
                easy.proxy_password(password)?;
            }
        }
        if let Some(interface) = &interface {
            easy.interface(interface)?;
        }
        if !headers.is_empty() {
            let mut list = List::new();
            for line in &headers {
                list.append(line)?;
            }
            easy.http_headers(list)?;
        }
        if let Some(entry) = &resolve {
            let mut list = List::new();
            list.append(entry)?;
            easy.resolve(list)?;
        }
        if verbose {
            easy.verbose(true)?;
        }

        debug!("curl perform: {} {}", custom_method.as_deref().unwrap_or("GET"), url);

        {
            let mut transfer = easy.transfer();

            transfer.write_function(|data| Ok(sink.write(data)))?;

            if let Some(reader) = upload.as_mut() {
                transfer.read_function(move |buf| {
                    reader.read(buf).map_err(|e| {
                        debug!("Upload read failed: {}", e);
                        ReadError::Abort
                    })
                })?;
            }

            transfer.perform()?;
        }

        let status = u16::try_from(easy.response_code()?).unwrap_or(0);
        let primary_ip = easy.primary_ip()?.map(|s| s.to_string());

        Ok(TransportInfo { status, primary_ip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Discard;

    impl ResponseSink for Discard {
        fn write(&mut self, data: &[u8]) -> usize {
            data.len()
        }
    }

    #[test]
    fn bad_url_is_init_error() {
        let transport = CurlTransport::new();
        let request = TransportRequest {
            url: "http://bad\0url/".into(),
            ..Default::default()
        };
        let err = transport.perform(request, &mut Discard).unwrap_err();
        assert!(matches!(err, Error::TransportInit(_)));
    }

    #[test]
    fn unsupported_protocol_is_transport_error() {
        let transport = CurlTransport::new();
        let request = TransportRequest {
            url: "nosuchproto://example.test/".into(),
            ..Default::default()
        };
        let err = transport.perform(request, &mut Discard).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
