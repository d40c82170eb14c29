use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Compression {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Compression {
    /// Stable short name, used both in configuration and in the `compression`
    /// column next to every stored blob. Round-trips through `FromStr`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Deflate => "deflate",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Deflate)]
    #[case(Compression::Gzip)]
    #[case(Compression::Bzip2)]
    #[cfg_attr(feature = "zstd", case(Compression::Zstd))]
    fn test_name_is_parseable(#[case] format: Compression) {
        assert_eq!(format.as_str().parse::<Compression>().unwrap(), format);
        assert_eq!(format.to_string(), format.as_str());
    }

    #[test]
    fn test_is_compressed() {
        assert!(!Compression::None.is_compressed());
        assert!(Compression::Deflate.is_compressed());
    }
}
