use crate::engine::{Engine, Handler};
use crate::options::{Options, Proxy, ProxyType};
use crate::request::Request;
use crate::Error;

use super::scenario::Scripted;

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello";

fn get(url: &str) -> Request {
    Request::from_url(url).unwrap()
}

#[test]
fn receive_simple_response() {
    let engine = Engine::new(Scripted::new(RESPONSE).primary_ip("192.0.2.1"));

    let response = engine
        .fire(&get("http://example.test/a?x=1"), &Options::default())
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.headers().len(), 1);
    assert_eq!(response.body().unwrap().unwrap(), b"hello");
    assert_eq!(response.primary_ip(), Some("192.0.2.1"));
    assert!(response.file().is_none());

    let seen = engine.transport().seen().unwrap();
    assert!(seen.contains("http://example.test/a?x=1"));
}

#[test]
fn receive_in_many_chunks() {
    for size in 1..RESPONSE.len() {
        let engine = Engine::new(Scripted::chunks_of(RESPONSE, size));
        let response = engine
            .fire(&get("http://example.test/a"), &Options::default())
            .unwrap();
        assert_eq!(response.body().unwrap().unwrap(), b"hello");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }
}

#[test]
fn receive_redirect_chain() {
    const RES: &[u8] = b"HTTP/1.1 301 Moved Permanently\r\n\
        Location: http://example.test/b\r\n\
        Content-Length: 0\r\n\
        \r\n\
        HTTP/1.1 200 OK\r\n\
        Content-Length: 4\r\n\
        X-Hop: final\r\n\
        \r\n\
        done";

    let engine = Engine::new(Scripted::new(RES));
    let opts = Options {
        allow_redirects: Some(true),
        ..Default::default()
    };

    let response = engine.fire(&get("http://example.test/a"), &opts).unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body().unwrap().unwrap(), b"done");
    assert_eq!(response.header("x-hop"), Some("final"));
    assert_eq!(response.header("content-length"), Some("4"));
    assert_eq!(response.header("location"), None);
}

#[test]
fn receive_through_connect_tunnel() {
    const RES: &[u8] = b"HTTP/1.1 200 Connection established\r\n\
        \r\n\
        HTTP/1.1 404 Not Found\r\n\
        Content-Type: text/html\r\n\
        \r\n\
        <h1>nope</h1>";

    let engine = Engine::new(Scripted::new(RES));
    let opts = Options {
        proxy: Some(Proxy::new(ProxyType::Http, "proxy.test", 3128)),
        ..Default::default()
    };

    let response = engine.fire(&get("https://example.test/"), &opts).unwrap();

    assert_eq!(response.status(), 404);
    assert!(!response.is_success());
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.text().unwrap().as_deref(), Some("<h1>nope</h1>"));

    let seen = engine.transport().seen().unwrap();
    assert!(seen.contains("proxy.test:3128"));
}

#[test]
fn receive_head_without_body() {
    let engine = Engine::new(Scripted::new(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n"));
    let mut request = get("http://example.test/");
    request.set_method("HEAD").unwrap();

    let response = engine.fire(&request, &Options::default()).unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("content-length"), Some("5"));
    assert_eq!(response.body().unwrap().unwrap(), b"");
}

#[test]
fn receive_without_headers() {
    // Nothing resembling a status line, all of it is body.
    let engine = Engine::new(Scripted::new(b"raw bytes").status(200));
    let response = engine
        .fire(&get("http://example.test/"), &Options::default())
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().is_empty());
    assert_eq!(response.body().unwrap().unwrap(), b"raw bytes");
}

#[test]
fn transport_error_surfaces() {
    let engine = Engine::new(Scripted::chunked(vec![]).fail_with(7, "Couldn't connect to server"));
    let err = engine
        .fire(&get("http://example.test/"), &Options::default())
        .unwrap_err();
    let Error::Transport { code, message } = err else {
        panic!("Expected Error::Transport");
    };
    assert_eq!(code, 7);
    assert_eq!(message, "Couldn't connect to server");
}

#[test]
fn handler_by_reference() {
    fn fire_with(handler: impl Handler) -> u16 {
        handler
            .fire(&get("http://example.test/"), &Options::default())
            .unwrap()
            .status()
    }

    let engine = Engine::new(Scripted::new(RESPONSE));
    assert_eq!(fire_with(&engine), 200);
    assert_eq!(fire_with(&engine), 200);
}
