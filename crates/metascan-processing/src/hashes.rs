//! File digests

use md5::Md5;
use metascan_core::FileHashes;
use sha1::Sha1;
use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 64 * 1024;

/// Compute MD5, SHA-1 and SHA-256 over `data` in a single chunked pass.
pub fn compute_hashes(data: &[u8]) -> FileHashes {
    let mut md5_hasher = Md5::new();
    let mut sha1_hasher = Sha1::new();
    let mut sha256_hasher = Sha256::new();

    for chunk in data.chunks(CHUNK_SIZE) {
        md5_hasher.update(chunk);
        sha1_hasher.update(chunk);
        sha256_hasher.update(chunk);
    }

    FileHashes {
        md5: hex::encode(md5_hasher.finalize()),
        sha1: hex::encode(sha1_hasher.finalize()),
        sha256: hex::encode(sha256_hasher.finalize()),
        file_size: data.len() as u64,
    }
}
