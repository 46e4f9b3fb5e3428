use thiserror::Error;

/// Errors returned by HTTP transports.
///
/// Non-2xx statuses are not errors; callers inspect
/// [`HttpResponse::status_code`](crate::HttpResponse::status_code)
/// themselves. `Clone` so test doubles can replay a configured error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response body exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
}
