//! HTTP transport for the ember off-chain gateway.
//!
//! The gateway reaches external endpoints through the [`HttpClient`]
//! contract so the transport can be substituted in tests. [`RestClient`]
//! is the production implementation.

pub mod client;
pub mod error;
pub mod http;

pub use client::{ClientConfig, RestClient};
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
