use pageserve::http::span::{find, split_by};

fn occurrences(buf: &[u8], delim: &[u8]) -> usize {
    let mut count = 0;
    let mut rest = buf;
    while let Some(at) = find(rest, delim) {
        count += 1;
        rest = &rest[at + delim.len()..];
    }
    count
}

#[test]
fn test_split_is_lossless() {
    let cases = [
        ("GET / HTTP/1.1", " "),
        ("a\r\nb\r\n\r\nc", "\r\n"),
        ("\r\n\r\n", "\r\n"),
        ("", "\r\n"),
        ("no delimiter here", "\r\n\r\n"),
        ("aaaa", "aa"),
        ("  leading and trailing  ", " "),
    ];

    for (buf, delim) in cases {
        let (buf, delim) = (buf.as_bytes(), delim.as_bytes());
        let spans = split_by(buf, delim).unwrap();
        assert_eq!(spans.join(delim), buf, "join mismatch for {:?}", buf);
        assert_eq!(spans.len(), occurrences(buf, delim) + 1);
    }
}

#[test]
fn test_split_spans_alias_input() {
    let buf = b"Host: a\r\nAccept: */*";
    let spans = split_by(buf, b"\r\n").unwrap();

    let start = buf.as_ptr() as usize;
    let end = start + buf.len();
    for span in spans.iter() {
        let ptr = span.as_ptr() as usize;
        assert!(ptr >= start && ptr <= end);
    }
}

#[test]
fn test_split_non_overlapping() {
    let spans = split_by(b"aaa", b"aa").unwrap();
    let expected: [&[u8]; 2] = [b"", b"a"];
    assert_eq!(&spans[..], &expected[..]);
}

#[test]
fn test_split_empty_buffer() {
    let spans = split_by(b"", b" ").unwrap();
    assert_eq!(spans.len(), 1);
    assert!(spans[0].is_empty());
}

#[test]
fn test_split_empty_delimiter_yields_whole_buffer() {
    let spans = split_by(b"abc", b"").unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0], b"abc");
}

#[test]
fn test_find() {
    assert_eq!(find(b"ab\r\n\r\ncd", b"\r\n\r\n"), Some(2));
    assert_eq!(find(b"ab\r\n", b"\r\n\r\n"), None);
    assert_eq!(find(b"", b"x"), None);
}
