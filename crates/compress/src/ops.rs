//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use bzip2::{Compression as BzCompression, read::BzDecoder, write::BzEncoder};
use exn::ResultExt;
use flate2::Compression as FlateCompression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::borrow::Cow;
use std::io::{Read, Write};
use tracing::instrument;
#[cfg(feature = "zstd")]
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

// Blobs are compressed on the write path of every cache insert, so the
// default (balanced) levels are used rather than the maximums.
const FLATE_LEVEL: u32 = 6;
const BZIP2_LEVEL: u32 = 6;
#[cfg(feature = "zstd")]
const ZSTD_LEVEL: i32 = 3;

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_compress::Compression;
    ///
    /// let data = b"{\"version\":8,\"sources\":{},\"layers\":[]}";
    /// let compressed = Compression::Deflate.compress(data).unwrap();
    /// assert_eq!(Compression::Deflate.decompress(&compressed).unwrap(), data);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    /// Compress `input`, but only keep the result when it is strictly smaller.
    ///
    /// Returns the bytes to store together with the format they are stored
    /// in: either `(compressed, self)` or `(input, Compression::None)`.
    /// Already-compressed payloads (PNG sprites, gzipped vector tiles) usually
    /// take the second branch.
    ///
    /// ```
    /// use tessera_compress::Compression;
    ///
    /// let (stored, format) = Compression::Deflate.shrink(b"x").unwrap();
    /// assert_eq!(format, Compression::None);
    /// assert_eq!(stored.as_ref(), b"x");
    /// ```
    pub fn shrink<'a>(&self, input: &'a [u8]) -> Result<(Cow<'a, [u8]>, Compression)> {
        if !self.is_compressed() {
            return Ok((Cow::Borrowed(input), Compression::None));
        }
        let compressed = self.compress(input)?;
        Ok(match compressed.len() < input.len() {
            true => (Cow::Owned(compressed), *self),
            false => (Cow::Borrowed(input), Compression::None),
        })
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let start = output.len();
        match self {
            Compression::None => output.extend_from_slice(input),
            Compression::Deflate => {
                let mut encoder = ZlibEncoder::new(&mut *output, FlateCompression::new(FLATE_LEVEL));
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, FlateCompression::new(FLATE_LEVEL));
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
            Compression::Bzip2 => {
                let mut encoder = BzEncoder::new(&mut *output, BzCompression::new(BZIP2_LEVEL));
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
            #[cfg(feature = "zstd")]
            Compression::Zstd => {
                let mut encoder = ZstdEncoder::new(&mut *output, ZSTD_LEVEL).or_raise(|| ErrorKind::Encoder)?;
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
        }
        let size = output.len() - start;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Deflate => ZlibDecoder::new(input).read_to_end(output).or_raise(|| ErrorKind::InvalidData)?,
            Compression::Gzip => GzDecoder::new(input).read_to_end(output).or_raise(|| ErrorKind::InvalidData)?,
            Compression::Bzip2 => BzDecoder::new(input).read_to_end(output).or_raise(|| ErrorKind::InvalidData)?,
            #[cfg(feature = "zstd")]
            Compression::Zstd => {
                let mut decoder = ZstdDecoder::new(input).or_raise(|| ErrorKind::Encoder)?;
                decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}
