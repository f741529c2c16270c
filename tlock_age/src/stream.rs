//! Chunked ChaCha20-Poly1305 AEAD, the AGE STREAM construction.
//!
//! Plaintext is split into 64 KiB chunks, each sealed under its own nonce
//! derived from a monotone counter plus a last-chunk flag. The payload key
//! is never reused across chunks; reuse across invocations is prevented by
//! deriving a fresh key per encryption (see `payload_key` in `header.rs`).

use crate::error::{Error, Result};
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, KeyInit, Nonce};

/// Plaintext bytes per chunk, the largest chunk `seal` will emit.
pub const CHUNK_SIZE: usize = 65536;
/// Poly1305 tag size appended to every sealed chunk.
pub const TAG_SIZE: usize = 16;
const SEALED_CHUNK_SIZE: usize = CHUNK_SIZE + TAG_SIZE;

fn nonce_for(counter: u64, last: bool) -> Nonce {
    let mut bytes = [0u8; 12];
    bytes[3..11].copy_from_slice(&counter.to_be_bytes());
    bytes[11] = u8::from(last);
    Nonce::clone_from_slice(&bytes)
}

/// Seals `plaintext` under `key` as a sequence of STREAM chunks.
///
/// Chunks of exactly `CHUNK_SIZE` plaintext bytes are emitted non-final;
/// the last chunk (which may be empty) always carries the last-chunk flag,
/// even when `plaintext.len()` is an exact multiple of `CHUNK_SIZE` - in
/// that case an extra, empty final chunk is appended.
pub fn seal(plaintext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.into());
    let full_chunks = plaintext.len() / CHUNK_SIZE;

    let mut out = Vec::with_capacity(plaintext.len() + TAG_SIZE * (full_chunks + 1));
    let mut counter: u64 = 0;
    for i in 0..full_chunks {
        let start = i * CHUNK_SIZE;
        let chunk = &plaintext[start..start + CHUNK_SIZE];
        let sealed = cipher
            .encrypt(&nonce_for(counter, false), chunk)
            .map_err(|_| Error::Internal("stream seal failed"))?;
        out.extend_from_slice(&sealed);
        counter = counter
            .checked_add(1)
            .ok_or(Error::Internal("stream counter overflow"))?;
    }

    let last_chunk = &plaintext[full_chunks * CHUNK_SIZE..];
    let sealed = cipher
        .encrypt(&nonce_for(counter, true), last_chunk)
        .map_err(|_| Error::Internal("stream seal failed"))?;
    out.extend_from_slice(&sealed);

    Ok(out)
}

/// Inverse of [`seal`]. Any tag failure, on any chunk, is `Authentication`.
pub fn open(ciphertext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(Error::InputValidation(
            "ciphertext shorter than one AEAD tag",
        ));
    }

    let cipher = ChaCha20Poly1305::new(key.into());
    let full_chunks = (ciphertext.len() - TAG_SIZE) / SEALED_CHUNK_SIZE;

    let mut out = Vec::with_capacity(ciphertext.len());
    let mut counter: u64 = 0;
    let mut offset = 0;
    for _ in 0..full_chunks {
        let chunk = &ciphertext[offset..offset + SEALED_CHUNK_SIZE];
        let opened = cipher
            .decrypt(&nonce_for(counter, false), chunk)
            .map_err(|_| Error::Authentication)?;
        out.extend_from_slice(&opened);
        offset += SEALED_CHUNK_SIZE;
        counter = counter
            .checked_add(1)
            .ok_or(Error::Internal("stream counter overflow"))?;
    }

    let last_chunk = &ciphertext[offset..];
    let opened = cipher
        .decrypt(&nonce_for(counter, true), last_chunk)
        .map_err(|_| Error::Authentication)?;
    out.extend_from_slice(&opened);

    Ok(out)
}
