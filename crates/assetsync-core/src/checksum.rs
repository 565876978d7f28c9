//! Content digests for cached files and remote bodies.
//!
//! Every digest in the system is MD5, because the remote signals we compare
//! against (`Content-MD5`, MD5-shaped entity tags) are MD5. Files are hashed
//! in fixed-size chunks so memory stays bounded for large video assets.

use md5::Digest as _;
use md5::Md5;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::CacheError;

const BUF_SIZE: usize = 64 * 1024;

/// Length of an MD5 digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// A 128-bit content digest. Displays as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Build from raw digest bytes; `None` unless exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Digest(arr))
    }

    /// Parse a 32-character hex string (either case).
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != DIGEST_LEN * 2 {
            return None;
        }
        let mut arr = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut arr).ok()?;
        Some(Digest(arr))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Incremental hasher fed chunk by chunk (e.g. from a curl write callback).
#[derive(Default)]
pub struct StreamHasher {
    inner: Md5,
    bytes: u64,
}

impl StreamHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes += data.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn finish(self) -> Digest {
        let out = self.inner.finalize();
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(&out);
        Digest(arr)
    }
}

/// Digest of an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = StreamHasher::new();
    hasher.update(data);
    hasher.finish()
}

/// Digest of a byte stream, read to completion in chunks.
/// Any read error aborts hashing; no partial digest is produced.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<Digest> {
    let mut hasher = StreamHasher::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

/// Digest of a file on disk, computed on the calling thread.
pub fn hash_path_blocking(path: &Path) -> Result<Digest, CacheError> {
    let hash_err = |source| CacheError::Hash {
        path: path.to_path_buf(),
        source,
    };
    let f = File::open(path).map_err(hash_err)?;
    hash_reader(f).map_err(hash_err)
}

/// Digest of a file on disk, computed on tokio's blocking pool.
pub async fn hash_path(path: &Path) -> Result<Digest, CacheError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_path_blocking(&owned))
        .await
        .map_err(|e| CacheError::Hash {
            path: path.to_path_buf(),
            source: io::Error::other(format!("hash task join: {}", e)),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_bytes_empty() {
        assert_eq!(
            hash_bytes(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn hash_bytes_known_content() {
        assert_eq!(
            hash_bytes(b"The quick brown fox jumps over the lazy dog").to_hex(),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn streaming_and_buffered_agree() {
        let samples: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"a".to_vec(),
            (0u8..=255).collect(),
            // crosses several chunk boundaries
            (0u8..251).cycle().take(BUF_SIZE * 3 + 17).collect(),
        ];
        for b in samples {
            assert_eq!(hash_bytes(&b), hash_reader(b.as_slice()).unwrap());
        }
    }

    #[test]
    fn stream_hasher_counts_bytes() {
        let mut h = StreamHasher::new();
        h.update(b"hello");
        h.update(b"\n");
        assert_eq!(h.bytes(), 6);
        assert_eq!(h.finish().to_hex(), "b1946ac92492d2347c6235b4d2611184");
    }

    #[test]
    fn from_hex_is_case_insensitive() {
        let lower = Digest::from_hex("9e107d9d372bb6826bd81d3542a419d6").unwrap();
        let upper = Digest::from_hex("9E107D9D372BB6826BD81D3542A419D6").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), "9e107d9d372bb6826bd81d3542a419d6");
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Digest::from_hex("abc").is_none());
        assert!(Digest::from_hex("zz107d9d372bb6826bd81d3542a419d6").is_none());
        assert!(Digest::from_bytes(&[0u8; 15]).is_none());
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "disk went away"));
            }
            self.served = true;
            buf[0] = b'x';
            Ok(1)
        }
    }

    #[test]
    fn read_failure_yields_no_digest() {
        assert!(hash_reader(FailingReader { served: false }).is_err());
    }

    #[test]
    fn hash_path_blocking_matches_hash_bytes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(hash_path_blocking(f.path()).unwrap(), hash_bytes(b"hello\n"));
    }

    #[tokio::test]
    async fn hash_path_missing_file_is_hash_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = hash_path(&dir.path().join("nope.mp4")).await.unwrap_err();
        assert!(matches!(err, CacheError::Hash { .. }));
    }
}
