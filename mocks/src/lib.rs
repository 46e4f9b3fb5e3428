//! Expectation-based test doubles for the ember node's external seams.
//!
//! Unlike state-based fakes, the mocks here replay programmer-configured
//! expectations: each operation is configured with expected arguments and a
//! reply (a fixed value or a callback computing one from the actual
//! arguments), invocations are matched against that configuration, and
//! every mock asserts on drop that all of its expectations were exercised.
//!
//! ```
//! use ember_gateway::{HttpClient, HttpRequest, HttpResponse};
//! use ember_mocks::MockHttpClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let client = MockHttpClient::new();
//! client.expect_send().return_const(Ok(HttpResponse {
//!     status_code: 200,
//!     headers: Default::default(),
//!     body: b"pong".to_vec(),
//! }));
//!
//! let resp = client
//!     .send(HttpRequest::get("https://oracle.example/ping"))
//!     .await
//!     .unwrap();
//! assert_eq!(resp.status_code, 200);
//! # }
//! ```

pub mod expect;
pub mod http;
pub mod keystore;

pub use expect::{any, eq, satisfies, ArgMatcher, CallBuilder, ExpectationSet};
pub use http::MockHttpClient;
pub use keystore::MockKeyStore;
