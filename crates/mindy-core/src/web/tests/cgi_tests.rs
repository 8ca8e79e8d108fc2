use std::io::Cursor;

use bytes::Bytes;
use http::{Method, StatusCode};

use crate::kernel::error::Error;
use crate::web::cgi::{CgiEnvironment, send_response};

#[test]
fn test_is_gateway() {
    assert!(CgiEnvironment::from_vars([("GATEWAY_INTERFACE", "CGI/1.1")]).is_gateway());
    assert!(!CgiEnvironment::from_vars([("TERM", "xterm")]).is_gateway());
}

#[test]
fn test_build_request_from_request_uri() {
    let cgi = CgiEnvironment::from_vars([
        ("REQUEST_METHOD", "GET"),
        ("REQUEST_URI", "/blog/post?page=2"),
        ("HTTP_HOST", "example.test"),
        ("HTTP_ACCEPT_LANGUAGE", "ru"),
        ("SERVER_NAME", "ignored"),
    ]);
    let request = cgi.build_request(std::io::empty()).unwrap();

    assert_eq!(request.method(), Method::GET);
    assert_eq!(request.uri().path(), "/blog/post");
    assert_eq!(request.uri().query(), Some("page=2"));
    assert_eq!(request.headers()["host"], "example.test");
    assert_eq!(request.headers()["accept-language"], "ru");
    assert!(request.headers().get("server-name").is_none());
    assert!(request.body().is_empty());
}

#[test]
fn test_build_request_from_path_info() {
    let cgi = CgiEnvironment::from_vars([
        ("SCRIPT_NAME", "/index.cgi"),
        ("PATH_INFO", "/users"),
        ("QUERY_STRING", "sort=name"),
    ]);
    let request = cgi.build_request(std::io::empty()).unwrap();
    assert_eq!(request.method(), Method::GET);
    assert_eq!(request.uri(), "/index.cgi/users?sort=name");
}

#[test]
fn test_build_request_defaults_to_root() {
    let request = CgiEnvironment::default().build_request(std::io::empty()).unwrap();
    assert_eq!(request.uri(), "/");
}

#[test]
fn test_build_request_reads_content_length_bytes() {
    let cgi = CgiEnvironment::from_vars([
        ("REQUEST_METHOD", "POST"),
        ("REQUEST_URI", "/form"),
        ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
        ("CONTENT_LENGTH", "7"),
    ]);
    let request = cgi.build_request(Cursor::new("a=1&b=2&trailing")).unwrap();

    assert_eq!(request.method(), Method::POST);
    assert_eq!(request.body(), &Bytes::from_static(b"a=1&b=2"));
    assert_eq!(request.headers()["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(request.headers()["content-length"], "7");
}

#[test]
fn test_build_request_rejects_bad_input() {
    let bad_length = CgiEnvironment::from_vars([("CONTENT_LENGTH", "lots")]);
    assert!(matches!(
        bad_length.build_request(std::io::empty()),
        Err(Error::InvalidRequest { .. })
    ));

    let bad_method = CgiEnvironment::from_vars([("REQUEST_METHOD", "GE T")]);
    assert!(matches!(
        bad_method.build_request(std::io::empty()),
        Err(Error::InvalidRequest { .. })
    ));
}

#[test]
fn test_send_response_writes_status_headers_and_body() {
    let response = http::Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("content-type", "text/plain")
        .body(Bytes::from_static(b"missing"))
        .unwrap();
    let mut output = Vec::new();
    send_response(&response, &mut output).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Status: 404 Not Found\r\ncontent-type: text/plain\r\n\r\nmissing"
    );
}
