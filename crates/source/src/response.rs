use derive_more::{Display, Error};
use time::UtcDateTime;

/// Why a fetch failed, as classified by the fetch source. Propagated
/// verbatim to region observers.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// The server answered 404 (or the local file does not exist).
    #[display("not found")]
    NotFound,
    /// The server answered with a 5xx.
    #[display("server error")]
    Server,
    /// No connection could be established.
    #[display("connection error")]
    Connection,
    /// The server asked the client to slow down.
    #[display("rate limited")]
    RateLimit,
    #[display("other error")]
    Other,
}

/// A transport-level failure reported by a [`FileSource`](crate::FileSource).
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("{reason}: {message}")]
pub struct ResponseError {
    pub reason: ErrorReason,
    pub message: String,
}
impl ResponseError {
    pub fn new(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self { reason, message: message.into() }
    }
}

/// The normalized result of fetching a resource.
///
/// Exactly one of three shapes:
/// - **error**: `error` is set, nothing else is meaningful;
/// - **not modified**: a conditional request confirmed the cached copy, only
///   the freshness metadata is meaningful;
/// - **content**: `data` holds the payload, or is `None` for a legitimate
///   "no content" answer (which is cached, unlike an error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub data: Option<Vec<u8>>,
    pub not_modified: bool,
    pub must_revalidate: bool,
    pub etag: Option<String>,
    pub modified: Option<UtcDateTime>,
    pub expires: Option<UtcDateTime>,
    pub error: Option<ResponseError>,
}
impl Response {
    pub fn ok(data: impl Into<Vec<u8>>) -> Self {
        Self { data: Some(data.into()), ..Self::default() }
    }

    pub fn no_content() -> Self {
        Self::default()
    }

    pub fn not_modified() -> Self {
        Self { not_modified: true, ..Self::default() }
    }

    pub fn error(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self { error: Some(ResponseError::new(reason, message)), ..Self::default() }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_modified(mut self, modified: UtcDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_expires(mut self, expires: UtcDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_must_revalidate(mut self, must_revalidate: bool) -> Self {
        self.must_revalidate = must_revalidate;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `true` for a successful answer that carries no payload.
    pub fn is_no_content(&self) -> bool {
        self.error.is_none() && !self.not_modified && self.data.is_none()
    }

    /// Whether a cached copy with these freshness fields can be used without a
    /// round trip to the network.
    pub fn is_fresh(&self, now: UtcDateTime) -> bool {
        !self.must_revalidate && self.expires.is_some_and(|expires| expires > now)
    }
}
