use crate::http::request::{ConnectionPolicy, RequestLine, find_header};
use crate::http::span::{ByteSpan, SpanList, SplitError, find, split_by};

pub const CRLF: &[u8] = b"\r\n";
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug)]
pub enum ParseError {
    /// Request line is not `METHOD SP TARGET SP VERSION`.
    InvalidRequest,
    /// Method token is not one of the recognised methods.
    InvalidMethod,
    /// No `\r\n\r\n` in the bytes handed to the parser.
    Incomplete,
    Alloc(SplitError),
}

/// Returns the length of the request head, terminator included.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    find(buf, HEAD_TERMINATOR).map(|at| at + HEAD_TERMINATOR.len())
}

/// The request line and header lines of one request, borrowed from the read buffer.
#[derive(Debug)]
pub struct RequestHead<'a> {
    lines: SpanList<'a>,
}

impl<'a> RequestHead<'a> {
    /// Splits a head (as delimited by [`find_head_end`]) into lines.
    pub fn parse(buf: &'a [u8]) -> Result<Self, ParseError> {
        let blocks = split_by(buf, HEAD_TERMINATOR).map_err(ParseError::Alloc)?;
        if blocks.len() < 2 {
            return Err(ParseError::Incomplete);
        }
        let lines = split_by(blocks[0], CRLF).map_err(ParseError::Alloc)?;

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[ByteSpan<'a>] {
        &self.lines
    }

    pub fn request_line(&self) -> Result<RequestLine<'a>, ParseError> {
        match self.lines.first() {
            Some(line) if !line.is_empty() => RequestLine::parse(line),
            _ => Err(ParseError::InvalidRequest),
        }
    }

    pub fn header(&self, name: &str) -> Option<ByteSpan<'a>> {
        find_header(&self.lines, name.as_bytes())
    }

    pub fn policy(&self) -> ConnectionPolicy {
        ConnectionPolicy::from_lines(&self.lines)
    }
}
