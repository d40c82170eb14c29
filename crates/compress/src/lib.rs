//! Payload compression for cached resources.
//!
//! Wraps the codecs the cache can store a blob with behind a single
//! [`Compression`] enum:
//!
//! - **Name parsing** for configuration ([`FromStr`](std::str::FromStr)) and
//!   the stable name written next to every stored blob ([`Compression::as_str`])
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`]) plus [`Compression::shrink`], which only
//!   keeps the compressed form when it is actually smaller
//!
//! Deflate (zlib framing), Gzip and Bzip2 are always available. Zstd sits
//! behind the `zstd` feature.

mod construct;
pub mod error;
mod ops;
mod util;

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (stored as-is).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Deflate stream with zlib framing
    Deflate,
    /// Gzip compression
    Gzip,
    /// Bzip2 compression
    Bzip2,
    /// Zstd compression
    #[cfg(feature = "zstd")]
    Zstd,
}
