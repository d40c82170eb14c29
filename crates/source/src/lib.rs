//! The vocabulary shared by every part of the offline cache: what a cacheable
//! [`Resource`] is, what a fetch [`Response`] looks like, and the
//! [`FileSource`] collaborator that produces responses.
//!
//! The cache never speaks HTTP. Whatever sits behind [`FileSource`] (an HTTP
//! client with its own retry/backoff, a local asset directory, a test double)
//! normalizes its result into a [`Response`].

mod resource;
mod response;
mod source;

pub use crate::resource::{CacheKey, Resource, ResourceKind, TileCoordinates};
pub use crate::response::{ErrorReason, Response, ResponseError};
#[cfg(feature = "mock")]
pub use crate::source::MockSource;
pub use crate::source::FileSource;
use std::sync::Arc;

pub type SourceHandle = Arc<dyn FileSource + Send + Sync>;
