use std::fmt;
use std::io;

use crate::client::ResponseError;

/// Error type for http-handler
#[derive(Debug)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum Error {
    TransportInit(String),
    UnsupportedFile(String),
    Io(String),
    UrlParse(String),
    Config(String),
    BadMethod(String),
    Transport { code: i64, message: String },
    Status(Box<ResponseError>),
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

#[cfg(feature = "curl")]
impl From<curl::Error> for Error {
    fn from(value: curl::Error) -> Self {
        let message = match value.extra_description() {
            Some(extra) => format!("{}: {}", value.description(), extra),
            None => value.description().to_string(),
        };
        Error::Transport {
            code: i64::from(value.code()),
            message,
        }
    }
}

#[cfg(feature = "curl")]
impl From<curl::FormError> for Error {
    fn from(value: curl::FormError) -> Self {
        Error::Transport {
            code: i64::from(value.code()),
            message: value.to_string(),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportInit(v) => write!(f, "cannot init transport: {}", v),
            Error::UnsupportedFile(v) => write!(f, "file is not locally addressable: {}", v),
            Error::Io(v) => write!(f, "io: {}", v),
            Error::UrlParse(v) => write!(f, "cannot parse url: {}", v),
            Error::Config(v) => write!(f, "bad options: {}", v),
            Error::BadMethod(v) => write!(f, "bad method: {}", v),
            Error::Transport { code, message } => {
                write!(f, "transport error {}: {}", code, message)
            }
            Error::Status(v) => write!(
                f,
                "{} {} responded with status {}",
                v.request().method(),
                v.request().url(),
                v.response().status()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        let Error::Io(msg) = error else {
            panic!("Not Error::Io");
        };
        assert_eq!(msg, "denied");
    }

    #[test]
    fn test_display_transport() {
        let err = Error::Transport {
            code: 28,
            message: "Timeout was reached".into(),
        };
        assert_eq!(err.to_string(), "transport error 28: Timeout was reached");
    }

    #[test]
    fn test_display_status() {
        let request = Request::from_url("http://example.test/missing").unwrap();
        let response = Response::new(404);
        let err = Error::Status(Box::new(ResponseError::new(request, response)));
        assert_eq!(
            err.to_string(),
            "GET http://example.test/missing responded with status 404"
        );
    }

    #[cfg(feature = "curl")]
    #[test]
    fn test_from_curl_error() {
        // CURLE_COULDNT_RESOLVE_HOST
        let error: Error = curl::Error::new(6).into();
        let Error::Transport { code, message } = error else {
            panic!("Not Error::Transport");
        };
        assert_eq!(code, 6);
        assert!(!message.is_empty());
    }
}
