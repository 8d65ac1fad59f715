//! Transport-neutral HTTP request and response

use crate::api::constants::headers;

/// Case-insensitive ordered header list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace any existing value for `name`
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.0.push((name, value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// A fully built request: method, target (path + query), headers, body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Request without a body, `Content-Length: 0`
    pub fn empty(method: impl Into<String>, target: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.set(headers::CONTENT_LENGTH, "0");
        Self {
            method: method.into(),
            target: target.into(),
            headers,
            body: None,
        }
    }

    /// Request with a body of the given content type
    pub fn with_body(
        method: impl Into<String>,
        target: impl Into<String>,
        content_type: &str,
        body: Vec<u8>,
    ) -> Self {
        let mut headers = Headers::new();
        headers.set(headers::CONTENT_LENGTH, body.len().to_string());
        headers.set(headers::CONTENT_TYPE, content_type);
        Self {
            method: method.into(),
            target: target.into(),
            headers,
            body: Some(body),
        }
    }

    /// Standard `Accept` and `Host` headers
    pub fn accept_json(mut self, host: &str) -> Self {
        self.headers.set(headers::ACCEPT, headers::CONTENT_TYPE_JSON);
        self.headers.set(headers::HOST, host);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Body bytes, `None` when absent or empty
    pub fn content(&self) -> Option<&[u8]> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }

    pub fn body_text(&self) -> Option<String> {
        self.content().map(|b| String::from_utf8_lossy(b).into_owned())
    }
}
