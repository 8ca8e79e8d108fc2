use std::collections::HashMap;
use std::io::{Read, Write};

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, Uri};

use crate::kernel::constants::GATEWAY_INTERFACE_VAR;
use crate::kernel::error::{Error, Result};
use crate::web::{Request, Response};

/// Snapshot of the CGI meta-variables describing the current request.
#[derive(Debug, Clone, Default)]
pub struct CgiEnvironment {
    vars: HashMap<String, String>,
}

impl CgiEnvironment {
    /// Capture the variables of the running process.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// True when a web server launched this process through a gateway interface.
    pub fn is_gateway(&self) -> bool {
        self.vars.contains_key(GATEWAY_INTERFACE_VAR)
    }

    /// Build the request from the meta-variables, reading `CONTENT_LENGTH`
    /// bytes of body from `body`.
    pub fn build_request<R: Read>(&self, body: R) -> Result<Request> {
        let method = match self.var("REQUEST_METHOD") {
            Some(m) => Method::from_bytes(m.as_bytes()).map_err(|e| Error::InvalidRequest {
                message: format!("bad REQUEST_METHOD '{}': {}", m, e),
            })?,
            None => Method::GET,
        };

        let target = self.request_target();
        let uri: Uri = target.parse().map_err(|e| Error::InvalidRequest {
            message: format!("bad request target '{}': {}", target, e),
        })?;

        let mut builder = http::Request::builder().method(method).uri(uri);

        for (name, value) in &self.vars {
            let Some(suffix) = name.strip_prefix("HTTP_") else {
                continue;
            };
            let header = suffix.to_ascii_lowercase().replace('_', "-");
            let header = HeaderName::from_bytes(header.as_bytes()).map_err(|e| Error::InvalidRequest {
                message: format!("bad header name from '{}': {}", name, e),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidRequest {
                message: format!("bad value for '{}': {}", name, e),
            })?;
            builder = builder.header(header, value);
        }
        if let Some(content_type) = self.var("CONTENT_TYPE").filter(|v| !v.is_empty()) {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        let length = self.content_length()?;
        let mut payload = Vec::with_capacity(length);
        if length > 0 {
            builder = builder.header(CONTENT_LENGTH, length);
            body.take(length as u64)
                .read_to_end(&mut payload)
                .map_err(|e| Error::io(e, "read request body"))?;
        }

        Ok(builder.body(Bytes::from(payload))?)
    }

    fn request_target(&self) -> String {
        if let Some(uri) = self.var("REQUEST_URI").filter(|v| !v.is_empty()) {
            return uri.to_string();
        }
        let mut target = String::new();
        target.push_str(self.var("SCRIPT_NAME").unwrap_or(""));
        target.push_str(self.var("PATH_INFO").unwrap_or(""));
        if target.is_empty() {
            target.push('/');
        }
        if let Some(query) = self.var("QUERY_STRING").filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    fn content_length(&self) -> Result<usize> {
        match self.var("CONTENT_LENGTH").map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse().map_err(|_| Error::InvalidRequest {
                message: format!("bad CONTENT_LENGTH '{}'", raw),
            }),
            None => Ok(0),
        }
    }
}

/// Emit `response` to the gateway: status line, headers, blank line, body.
pub fn send_response<W: Write>(response: &Response, out: &mut W) -> Result<()> {
    let status = response.status();
    let write = |out: &mut W| -> std::io::Result<()> {
        write!(out, "Status: {} {}\r\n", status.as_u16(), status.canonical_reason().unwrap_or(""))?;
        for (name, value) in response.headers() {
            out.write_all(name.as_str().as_bytes())?;
            out.write_all(b": ")?;
            out.write_all(value.as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(response.body())?;
        out.flush()
    };
    write(out).map_err(|e| Error::io(e, "send response"))
}
