//! Expectation-based mock of the gateway's HTTP transport seam.

use async_trait::async_trait;
use ember_gateway::{HttpClient, HttpError, HttpRequest, HttpResponse};

use crate::expect::{CallBuilder, ExpectationSet};

/// Mock [`HttpClient`].
///
/// Replays configured response/error pairs without any network activity.
/// Supports a static return pair or a callback computing the pair from the
/// actual request.
pub struct MockHttpClient {
    send: ExpectationSet<HttpRequest, Result<HttpResponse, HttpError>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            send: ExpectationSet::new("MockHttpClient::send"),
        }
    }

    /// Expect a `send` invocation. The argument is the full request.
    pub fn expect_send(
        &self,
    ) -> CallBuilder<'_, HttpRequest, Result<HttpResponse, HttpError>> {
        self.send.expect()
    }

    /// Assert that every configured expectation was matched.
    ///
    /// Runs automatically on drop; call it directly to fail at a specific
    /// point instead.
    pub fn verify(&self) {
        let unmet = self.send.unmet();
        if !unmet.is_empty() {
            panic!(
                "MockHttpClient: unmet expectations:\n  {}",
                unmet.join("\n  ")
            );
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.send.call(req)
    }
}

impl Drop for MockHttpClient {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.verify();
        }
    }
}
