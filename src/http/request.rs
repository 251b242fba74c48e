use crate::http::parser::ParseError;
use crate::http::span::{ByteSpan, split_by};

/// HTTP request methods that pass request-line validation.
///
/// Only GET is served. The others are recognised so the server can answer
/// them with 405 Method Not Allowed instead of 400 Bad Request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is byte-exact and case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use pageserve::http::request::Method;
    /// assert_eq!(Method::from_bytes(b"GET"), Some(Method::GET));
    /// assert_eq!(Method::from_bytes(b"get"), None);
    /// ```
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        match token {
            b"GET" => Some(Method::GET),
            b"POST" => Some(Method::POST),
            b"PUT" => Some(Method::PUT),
            b"DELETE" => Some(Method::DELETE),
            b"HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
        }
    }
}

/// A validated request line. Target and version are carried through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: Method,
    pub target: ByteSpan<'a>,
    pub version: ByteSpan<'a>,
}

impl<'a> RequestLine<'a> {
    /// Builds a request line from its space-separated tokens.
    ///
    /// Exactly three tokens are required and the first must be an allowed
    /// method. Nothing else is checked: a strange target or version surfaces
    /// later as a routing error or a 404.
    pub fn from_tokens(tokens: &[ByteSpan<'a>]) -> Result<Self, ParseError> {
        let &[method, target, version] = tokens else {
            return Err(ParseError::InvalidRequest);
        };
        let method = Method::from_bytes(method).ok_or(ParseError::InvalidMethod)?;

        Ok(Self {
            method,
            target,
            version,
        })
    }

    /// Splits a raw request line on single spaces and validates it.
    pub fn parse(line: ByteSpan<'a>) -> Result<Self, ParseError> {
        let tokens = split_by(line, b" ").map_err(ParseError::Alloc)?;
        Self::from_tokens(&tokens)
    }
}

/// Looks up a header in the head's lines (request line first, then headers).
///
/// Names compare byte-exact, so `connection` does not find `Connection`.
/// The value is whatever follows `": "`; a header with nothing after the
/// separator counts as absent. Only the first occurrence of a name is seen.
pub fn find_header<'a>(lines: &[ByteSpan<'a>], name: &[u8]) -> Option<ByteSpan<'a>> {
    lines.iter().skip(1).find_map(|&line| {
        let colon = line.iter().position(|&b| b == b':')?;
        if &line[..colon] != name {
            return None;
        }
        match &line[colon + 1..] {
            [b' ', value @ ..] if !value.is_empty() => Some(value),
            _ => None,
        }
    })
}

/// Whether the connection stays open after the current exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPolicy {
    KeepAlive,
    Close,
}

impl ConnectionPolicy {
    /// Derives the policy from the `Connection` header.
    ///
    /// Absent means keep-alive; otherwise only the exact value `keep-alive`
    /// keeps the connection, any other value closes it.
    pub fn from_lines(lines: &[ByteSpan<'_>]) -> Self {
        match find_header(lines, b"Connection") {
            None | Some(b"keep-alive") => ConnectionPolicy::KeepAlive,
            Some(_) => ConnectionPolicy::Close,
        }
    }

    pub fn header_value(&self) -> &'static str {
        match self {
            ConnectionPolicy::KeepAlive => "keep-alive",
            ConnectionPolicy::Close => "close",
        }
    }

    pub fn is_keep_alive(&self) -> bool {
        *self == ConnectionPolicy::KeepAlive
    }
}
