use crate::domain::HashAlgorithm;
use crate::ports::HashingPort;
use anyhow::{Context, Result};
use memmap2::MmapOptions;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::hash::Hasher;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use twox_hash::XxHash64;
use wyhash::WyHash;
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

const CHUNK_SIZE: usize = 8192;

/// Streaming state for one digest computation.
enum Digester {
    Sha256(Sha256),
    Blake3(blake3::Hasher),
    Md5(md5::Context),
    Sha1(Sha1),
    XxHash64(Xxh64),
    XxHash3(Xxh3),
    WyHash(WyHash),
    TwoXHash64(XxHash64),
}

impl Digester {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Digester::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Digester::Blake3(blake3::Hasher::new()),
            HashAlgorithm::Md5 => Digester::Md5(md5::Context::new()),
            HashAlgorithm::Sha1 => Digester::Sha1(Sha1::new()),
            HashAlgorithm::XxHash64 => Digester::XxHash64(Xxh64::new(0)),
            HashAlgorithm::XxHash3 => Digester::XxHash3(Xxh3::new()),
            HashAlgorithm::WyHash => Digester::WyHash(WyHash::with_seed(0)),
            HashAlgorithm::TwoXHash64 => Digester::TwoXHash64(XxHash64::with_seed(0)),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Digester::Sha256(h) => h.update(data),
            Digester::Blake3(h) => {
                h.update(data);
            }
            Digester::Md5(h) => h.consume(data),
            Digester::Sha1(h) => h.update(data),
            Digester::XxHash64(h) => h.update(data),
            Digester::XxHash3(h) => h.update(data),
            Digester::WyHash(h) => h.write(data),
            Digester::TwoXHash64(h) => h.write(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Digester::Sha256(h) => format!("{:x}", h.finalize()),
            Digester::Blake3(h) => h.finalize().to_hex().to_string(),
            Digester::Md5(h) => format!("{:x}", h.compute()),
            Digester::Sha1(h) => format!("{:x}", h.finalize()),
            Digester::XxHash64(h) => format!("{:016x}", h.digest()),
            Digester::XxHash3(h) => format!("{:016x}", h.digest()),
            Digester::WyHash(h) => format!("{:016x}", h.finish()),
            Digester::TwoXHash64(h) => format!("{:016x}", h.finish()),
        }
    }
}

/// Content hasher supporting every [`HashAlgorithm`].
///
/// Input is always fed to the digest in full `CHUNK_SIZE` blocks (only the last one may be
/// shorter), so streaming hashers produce the same value regardless of how the OS splits reads.
pub struct MultiAlgorithmHasher {
    mmap_threshold: u64,
}

impl MultiAlgorithmHasher {
    pub fn new() -> Self {
        Self {
            mmap_threshold: 64 * 1024 * 1024,
        }
    }

    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    fn hash_with_mmap(&self, file: &File, algorithm: HashAlgorithm) -> Result<String> {
        // SAFETY: the map is read-only and dropped before returning; a file truncated
        // underneath us is the same race any reader of a live filesystem accepts.
        let mmap = unsafe { MmapOptions::new().map(file)? };
        let mut digester = Digester::new(algorithm);
        for chunk in mmap.chunks(CHUNK_SIZE) {
            digester.update(chunk);
        }
        Ok(digester.finish())
    }

    fn hash_with_buffered_io<R: Read>(&self, reader: R, algorithm: HashAlgorithm) -> Result<String> {
        let mut reader = BufReader::with_capacity(CHUNK_SIZE, reader);
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut digester = Digester::new(algorithm);
        loop {
            let filled = fill_chunk(&mut reader, &mut buffer)?;
            if filled == 0 {
                break;
            }
            digester.update(&buffer[..filled]);
            if filled < CHUNK_SIZE {
                break;
            }
        }
        Ok(digester.finish())
    }
}

impl Default for MultiAlgorithmHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads until `buffer` is full or the reader is exhausted.
fn fill_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl HashingPort for MultiAlgorithmHasher {
    fn hash_file(&self, path: &Path, algorithm: HashAlgorithm) -> Result<String> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let file_size = file.metadata()?.len();

        let hash = if file_size > 0 && file_size >= self.mmap_threshold {
            self.hash_with_mmap(&file, algorithm)
        } else {
            self.hash_with_buffered_io(file, algorithm)
        };
        hash.with_context(|| format!("hashing {}", path.display()))
    }

    fn hash_partial(&self, path: &Path, bytes: u64, algorithm: HashAlgorithm) -> Result<String> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        self.hash_with_buffered_io(file.take(bytes), algorithm)
            .with_context(|| format!("hashing head of {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ALL: [HashAlgorithm; 8] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake3,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::XxHash64,
        HashAlgorithm::XxHash3,
        HashAlgorithm::WyHash,
        HashAlgorithm::TwoXHash64,
    ];

    #[test]
    fn sha256_matches_known_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc");
        fs::write(&path, b"abc").unwrap();

        let hash = MultiAlgorithmHasher::new().hash_file(&path, HashAlgorithm::Sha256).unwrap();
        assert_eq!(hash, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn partial_hash_of_short_file_equals_full_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short");
        fs::write(&path, vec![7u8; 1000]).unwrap();

        let hasher = MultiAlgorithmHasher::new();
        for algorithm in ALL {
            assert_eq!(
                hasher.hash_partial(&path, 4096, algorithm).unwrap(),
                hasher.hash_file(&path, algorithm).unwrap(),
                "{}",
                algorithm.as_str()
            );
        }
    }

    #[test]
    fn partial_hash_ignores_bytes_past_limit() {
        let dir = tempdir().unwrap();
        let mut a = vec![1u8; 4096];
        let mut b = a.clone();
        a.extend_from_slice(b"tail-one");
        b.extend_from_slice(b"tail-two");
        fs::write(dir.path().join("a"), &a).unwrap();
        fs::write(dir.path().join("b"), &b).unwrap();

        let hasher = MultiAlgorithmHasher::new();
        for algorithm in ALL {
            let pa = hasher.hash_partial(&dir.path().join("a"), 4096, algorithm).unwrap();
            let pb = hasher.hash_partial(&dir.path().join("b"), 4096, algorithm).unwrap();
            assert_eq!(pa, pb);
            let fa = hasher.hash_file(&dir.path().join("a"), algorithm).unwrap();
            let fb = hasher.hash_file(&dir.path().join("b"), algorithm).unwrap();
            assert_ne!(fa, fb, "{}", algorithm.as_str());
        }
    }

    #[test]
    fn mmap_and_buffered_paths_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data");
        let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let buffered = MultiAlgorithmHasher::new();
        let mapped = MultiAlgorithmHasher::new().with_mmap_threshold(1);
        for algorithm in ALL {
            assert_eq!(
                buffered.hash_file(&path, algorithm).unwrap(),
                mapped.hash_file(&path, algorithm).unwrap(),
                "{}",
                algorithm.as_str()
            );
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let hasher = MultiAlgorithmHasher::new();
        assert!(hasher.hash_file(&dir.path().join("gone"), HashAlgorithm::Sha256).is_err());
        assert!(hasher.hash_partial(&dir.path().join("gone"), 4096, HashAlgorithm::Sha256).is_err());
    }
}
