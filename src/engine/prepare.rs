use std::fs;
use std::time::Duration;

use http::Method;

use crate::options::Options;
use crate::request::{Body, FieldValue, Fields, Request};
use crate::transport::{FormPart, FormValue, TransportBody, TransportProxy, TransportRequest};
use crate::Error;

/// Lower a request and its options into transport settings.
///
/// Each option maps independently. Absent options are left at the
/// transport default.
pub(crate) fn prepare(request: &Request, options: &Options) -> Result<TransportRequest, Error> {
    let mut t = TransportRequest {
        url: request.url(),
        ..Default::default()
    };

    let method = request.method();

    if method != Method::GET.as_str() {
        t.custom_method = Some(method.to_string());
        t.body = prepare_body(request.body())?;
    }
    if method == Method::HEAD.as_str() {
        t.no_body = true;
    }

    t.timeout = options
        .timeout
        .filter(|s| *s > 0)
        .map(Duration::from_secs);
    t.connect_timeout = options
        .connect_timeout
        .filter(|s| *s > 0)
        .map(Duration::from_secs);

    t.follow_redirects = options.allow_redirects;
    t.cookie_jar = options.cookies.clone();
    t.ssl_verify = options.ssl_verify;

    if let Some(proxy) = options.proxy.as_ref().or(request.proxy()) {
        t.proxy = Some(TransportProxy {
            kind: proxy.kind,
            address: proxy.address(),
            credentials: proxy
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
        });
    }

    t.interface = request
        .outgoing_ip()
        .or(options.outgoing_ip.as_deref())
        .map(|s| s.to_string());

    t.headers = request
        .headers()
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();

    if let Some(auth) = &options.auth {
        let has_auth = request
            .headers()
            .keys()
            .any(|k| k.eq_ignore_ascii_case("authorization"));

        // An explicit header on the request wins.
        if !has_auth {
            t.headers.push(format!("Authorization: {}", auth.header_value()));
        }
    }

    if let Some(ip) = request.ip() {
        t.resolve = Some(format!(
            "{}:{}:{}",
            request.host(),
            request.effective_port(),
            ip
        ));
    }

    t.verbose = options.debug == Some(true);

    Ok(t)
}

fn prepare_body(body: &Body) -> Result<TransportBody, Error> {
    let t = match body {
        Body::Empty => TransportBody::None,
        Body::Raw(v) => TransportBody::Bytes(v.clone()),
        Body::Fields(fields) => {
            let mut parts = Vec::new();
            flatten_fields(None, fields, &mut parts)?;
            TransportBody::Form(parts)
        }
        Body::FileUpload(file) => {
            let Some(path) = file.local_path() else {
                return Err(Error::UnsupportedFile(file.location()));
            };
            let reader = fs::File::open(path)?;
            let size = file.size()?;
            TransportBody::Upload {
                reader: Box::new(reader),
                size,
            }
        }
    };

    Ok(t)
}

fn flatten_fields(
    prefix: Option<&str>,
    fields: &Fields,
    out: &mut Vec<FormPart>,
) -> Result<(), Error> {
    for (key, value) in fields {
        let name = match prefix {
            Some(p) => format!("{}[{}]", p, key),
            None => key.clone(),
        };

        match value {
            FieldValue::Text(text) => out.push(FormPart {
                name,
                value: FormValue::Text(text.clone()),
            }),
            FieldValue::File(file) => {
                let path = file
                    .local_path()
                    .ok_or_else(|| Error::UnsupportedFile(file.location()))?;
                out.push(FormPart {
                    name,
                    value: FormValue::File {
                        path: path.to_path_buf(),
                        filename: file.basename(),
                    },
                });
            }
            FieldValue::Nested(inner) => flatten_fields(Some(&name), inner, out)?,
        }
    }

    Ok(())
}
