//! The fetch source contract and an in-memory implementation for tests.

use crate::{Resource, Response};
use async_trait::async_trait;

/// Anything that can fetch a [`Resource`] from outside the cache.
///
/// Implementations own their concurrency, timeouts and retry/backoff. A
/// request always completes with a [`Response`]; transport failures are
/// reported through [`Response::error`], never by panicking or hanging.
///
/// # Examples
///
/// ```
/// use tessera_source::{FileSource, Resource};
///
/// async fn style_is_reachable(source: &dyn FileSource, url: &str) -> bool {
///     !source.request(&Resource::style(url)).await.is_error()
/// }
/// ```
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Fetch a single resource.
    async fn request(&self, resource: &Resource) -> Response;
}

#[cfg(feature = "mock")]
pub use self::mock::MockSource;

#[cfg(feature = "mock")]
mod mock {
    use super::FileSource;
    use crate::{ErrorReason, Resource, Response};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory fetch source for testing.
    ///
    /// Responses are keyed by the URL a real source would request (tile
    /// templates are expanded first, see [`Resource::request_url`]). Unknown
    /// URLs answer with [`ErrorReason::NotFound`]. Every request is recorded
    /// so tests can assert on network traffic.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_source::{FileSource, MockSource, Resource, Response};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let source = MockSource::with_responses([
    ///     ("https://example.com/style.json", Response::ok(b"{}".to_vec())),
    /// ]);
    /// let response = source.request(&Resource::style("https://example.com/style.json")).await;
    /// assert_eq!(response.data.as_deref(), Some(b"{}".as_slice()));
    /// assert_eq!(source.request_count().await, 1);
    /// # }
    /// ```
    pub struct MockSource {
        name: String,
        responses: RwLock<HashMap<String, Response>>,
        requests: RwLock<Vec<Resource>>,
    }

    impl MockSource {
        pub fn with_responses(responses: impl IntoIterator<Item = (impl Into<String>, Response)>) -> Self {
            Self {
                name: "mock".to_string(),
                responses: RwLock::new(responses.into_iter().map(|(url, response)| (url.into(), response)).collect()),
                requests: RwLock::new(Vec::new()),
            }
        }

        pub fn with_name(mut self, name: impl Into<String>) -> Self {
            self.name = name.into();
            self
        }

        /// Add or replace the response served for `url`.
        pub async fn insert(&self, url: impl Into<String>, response: Response) {
            self.responses.write().await.insert(url.into(), response);
        }

        pub async fn request_count(&self) -> usize {
            self.requests.read().await.len()
        }

        /// Every resource requested so far, in request order.
        pub async fn requests(&self) -> Vec<Resource> {
            self.requests.read().await.clone()
        }
    }
    impl Default for MockSource {
        fn default() -> Self {
            Self::with_responses(Vec::<(String, Response)>::new())
        }
    }

    #[async_trait]
    impl FileSource for MockSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn request(&self, resource: &Resource) -> Response {
            self.requests.write().await.push(resource.clone());
            let url = resource.request_url();
            match self.responses.read().await.get(&url) {
                Some(response) => response.clone(),
                None => Response::error(ErrorReason::NotFound, format!("no mock response for {url}")),
            }
        }
    }

}
