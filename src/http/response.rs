use crate::http::request::ConnectionPolicy;

/// HTTP status codes the server sends.
///
/// - `Ok` (200): Page found and sent
/// - `BadRequest` (400): Malformed, oversized, or unroutable request
/// - `NotFound` (404): No page at the routed path
/// - `MethodNotAllowed` (405): Recognised method other than GET
/// - `InternalServerError` (500): Page larger than the body limit
/// - `ServiceUnavailable` (503): Worker queue full under the reject policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pageserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A complete HTTP response ready to be written to a client.
///
/// Headers keep their insertion order on the wire.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", HTML_CONTENT_TYPE)
///     .connection(ConnectionPolicy::KeepAlive)
///     .body(page)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    connection: Option<ConnectionPolicy>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            connection: None,
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header. Names compare case-insensitively.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn connection(mut self, policy: ConnectionPolicy) -> Self {
        self.connection = Some(policy);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body size unless already set, then the
    /// `Connection` header last.
    pub fn build(mut self) -> Response {
        if !self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        {
            let len = self.body.len().to_string();
            self.headers.push(("Content-Length".to_string(), len));
        }
        if let Some(policy) = self.connection {
            self = self.header("Connection", policy.header_value());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A 200 carrying an HTML page.
    pub fn page(body: Vec<u8>, policy: ConnectionPolicy) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", HTML_CONTENT_TYPE)
            .connection(policy)
            .body(body)
            .build()
    }

    /// A 404 carrying an HTML error page. Always closes.
    pub fn not_found(body: Vec<u8>) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", HTML_CONTENT_TYPE)
            .connection(ConnectionPolicy::Close)
            .body(body)
            .build()
    }

    /// A bodiless response (`Content-Length: 0`).
    pub fn empty(status: StatusCode, policy: ConnectionPolicy) -> Self {
        ResponseBuilder::new(status).connection(policy).build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
