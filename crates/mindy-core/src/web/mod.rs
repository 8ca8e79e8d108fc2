//! # Mindy Web
//!
//! Request-serving side of the bootstrap: the request/response types handed
//! to kernels, CGI-style construction of a request from the ambient process
//! environment, response emission, and the HTTP cache decorator.
pub mod cache;
pub mod cgi;

use bytes::Bytes;

/// Request type handed to [`Kernel::handle`](crate::kernel::Kernel::handle).
pub type Request = http::Request<Bytes>;

/// Response type produced by kernels.
pub type Response = http::Response<Bytes>;

pub use cache::{CacheWrapperFactory, CacheWrapperRegistry, HttpCache};
pub use cgi::{CgiEnvironment, send_response};

#[cfg(test)]
mod tests;
