use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use tessera_compress::Compression;
use tessera_source::{ResourceKind, Response};
use time::UtcDateTime;

/// A cached payload plus its revalidation metadata.
///
/// `data` is always decompressed; `compression` and `stored_size` describe
/// the blob as it sits in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub kind: ResourceKind,
    /// `None` for a cached "no content" answer.
    pub data: Option<Vec<u8>>,
    pub compression: Compression,
    pub stored_size: u64,
    pub etag: Option<String>,
    pub modified: Option<UtcDateTime>,
    pub expires: Option<UtcDateTime>,
    pub must_revalidate: bool,
    pub accessed: UtcDateTime,
}
impl CacheEntry {
    pub fn is_compressed(&self) -> bool {
        self.compression.is_compressed()
    }

    /// The entry as a fetch response, e.g. to answer a request from cache.
    pub fn to_response(&self) -> Response {
        Response {
            data: self.data.clone(),
            etag: self.etag.clone(),
            modified: self.modified,
            expires: self.expires,
            must_revalidate: self.must_revalidate,
            ..Response::default()
        }
    }
}

/// Outcome of a write to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOutcome {
    /// `true` only when a new identity was created.
    pub inserted: bool,
    /// Byte length of the blob as stored (after compression).
    pub stored_size: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct EntryRow {
    kind: i64,
    etag: Option<String>,
    modified: Option<i64>,
    expires: Option<i64>,
    must_revalidate: bool,
    accessed: i64,
    data: Option<Vec<u8>>,
    compression: String,
}
impl TryFrom<EntryRow> for CacheEntry {
    type Error = Error;
    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let compression =
            row.compression.parse::<Compression>().or_raise(|| ErrorKind::InvalidData("compression format"))?;
        let stored_size = row.data.as_ref().map_or(0, |data| data.len() as u64);
        let data = match row.data {
            Some(blob) if compression.is_compressed() => {
                Some(compression.decompress(&blob).or_raise(|| ErrorKind::Compression)?)
            },
            data => data,
        };
        Ok(Self {
            kind: ResourceKind::from_code(row.kind),
            data,
            compression,
            stored_size,
            etag: row.etag,
            modified: row.modified.map(timestamp).transpose()?,
            expires: row.expires.map(timestamp).transpose()?,
            must_revalidate: row.must_revalidate,
            accessed: timestamp(row.accessed)?,
        })
    }
}

pub(crate) fn timestamp(seconds: i64) -> Result<UtcDateTime, Error> {
    UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData("timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(data: Option<Vec<u8>>, compression: &str) -> EntryRow {
        EntryRow {
            kind: ResourceKind::Style.code(),
            etag: Some("\"v1\"".to_string()),
            modified: None,
            expires: Some(1_800_000_000),
            must_revalidate: false,
            accessed: 1_700_000_000,
            data,
            compression: compression.to_string(),
        }
    }

    #[test]
    fn test_row_to_model_decompresses() {
        let payload = b"{\"version\":8,\"sources\":{},\"layers\":[]}".repeat(8);
        let blob = Compression::Deflate.compress(&payload).unwrap();
        let entry = CacheEntry::try_from(row(Some(blob.clone()), "deflate")).unwrap();
        assert_eq!(entry.kind, ResourceKind::Style);
        assert_eq!(entry.data, Some(payload));
        assert!(entry.is_compressed());
        assert_eq!(entry.stored_size, blob.len() as u64);
        assert_eq!(entry.expires.map(|e| e.unix_timestamp()), Some(1_800_000_000));
    }

    #[test]
    fn test_no_content_row() {
        let entry = CacheEntry::try_from(row(None, "none")).unwrap();
        assert_eq!(entry.data, None);
        assert_eq!(entry.stored_size, 0);
        assert!(entry.to_response().is_no_content());
    }

    #[test]
    fn test_unknown_compression_is_invalid() {
        let err = CacheEntry::try_from(row(Some(vec![1, 2, 3]), "lzma")).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("compression format"));
    }
}
