use pageserve::http::parser::{ParseError, RequestHead, find_head_end};
use pageserve::http::request::{ConnectionPolicy, Method};

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let end = find_head_end(req).unwrap();
    let head = RequestHead::parse(&req[..end]).unwrap();
    let line = head.request_line().unwrap();

    assert_eq!(line.method, Method::GET);
    assert_eq!(line.target, b"/");
    assert_eq!(line.version, b"HTTP/1.1");
    assert_eq!(head.header("Host"), Some(&b"example.com"[..]));
    assert_eq!(head.policy(), ConnectionPolicy::KeepAlive);
}

#[test]
fn test_head_end_excludes_pipelined_bytes() {
    let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    let end = find_head_end(req).unwrap();

    assert_eq!(&req[..end], b"GET /a HTTP/1.1\r\n\r\n");
}

#[test]
fn test_head_end_missing_terminator() {
    assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: example.com\r\n"), None);
}

#[test]
fn test_parse_without_terminator_is_incomplete() {
    let result = RequestHead::parse(b"GET / HTTP/1.1\r\n");
    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nConnection: close\r\n\r\n";
    let head = RequestHead::parse(req).unwrap();

    assert_eq!(head.lines().len(), 4);
    assert_eq!(head.header("User-Agent"), Some(&b"test-client"[..]));
    assert_eq!(head.policy(), ConnectionPolicy::Close);
}

#[test]
fn test_parse_empty_request_line() {
    let head = RequestHead::parse(b"\r\n\r\n").unwrap();
    assert!(matches!(head.request_line(), Err(ParseError::InvalidRequest)));
}

#[test]
fn test_parse_invalid_http_method() {
    let head = RequestHead::parse(b"INVALID / HTTP/1.1\r\n\r\n").unwrap();
    assert!(matches!(head.request_line(), Err(ParseError::InvalidMethod)));
}

#[test]
fn test_policy_survives_bad_request_line() {
    let head = RequestHead::parse(b"GARBAGE\r\nConnection: close\r\n\r\n").unwrap();

    assert!(head.request_line().is_err());
    assert_eq!(head.policy(), ConnectionPolicy::Close);
}

#[test]
fn test_parse_request_with_query_string_kept_verbatim() {
    let head = RequestHead::parse(b"GET /search?q=rust%20lang HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(head.request_line().unwrap().target, b"/search?q=rust%20lang");
}
