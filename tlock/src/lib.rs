//! # tlock
//!
//! tlock is a library to encrypt and decrypt 16-byte binaries using the
//! [tlock](https://eprint.iacr.org/2023/189) identity-based timelock scheme.
//! It consumes Threshold BLS signatures provided by
//! [drand](https://drand.love/docs/specification/) beacons, one per round.
//!
//! The key difference with the reference implementations is that a drand
//! client is not baked into the library: this crate provides `encrypt` and
//! `decrypt` over the IBE ciphertext only, given a public key / signature and
//! a [`SchemeId`] naming which of the three recognized drand chain schemes
//! is in play. This decouples the use of the drand network from the use of
//! tlock, and lets callers fetch beacons however they like (sync, async,
//! offline cache, ...).
//!
//! `tlock_age` builds on this crate to wrap a file key in a full AGE file.
//!
//! ## Example
//!
//! For a working example, refer to [examples/example1.rs](../examples/example1.rs).

mod error;
mod ibe;
mod scheme;

pub use error::{Error, Result};
pub use ibe::Ciphertext;
pub use scheme::{Group, SchemeId};

use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};
use tracing::info_span;

/// Derives the round identity `SHA-256(round_number as big-endian u64)`
/// hashed onto the group opposite the scheme's master key.
pub fn round_identity(round_number: u64) -> [u8; 32] {
    Sha256::digest(round_number.to_be_bytes()).into()
}

/// Encrypts a 16-byte message (typically an AGE file key) for a future
/// drand round.
///
/// `public_key_bytes` is the chain's distributed public key; its length
/// must match `scheme`'s master-key group (48 bytes for G1, 96 for G2).
///
/// ```rust
/// let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
/// let round = 1000;
/// let src = vec![0u8; 16];
///
/// let mut encrypted = vec![];
/// tlock::encrypt(&mut encrypted, src.as_slice(), tlock::SchemeId::PedersenBlsUnchained, &pk_bytes, round).unwrap();
/// ```
pub fn encrypt<W: Write, R: Read>(
    mut dst: W,
    mut src: R,
    scheme: SchemeId,
    public_key_bytes: &[u8],
    round_number: u64,
) -> Result<()> {
    let mut message = [0u8; 16];
    read_exact_or_zero_padded(&mut src, &mut message)?;

    let id = round_identity(round_number);
    let ct = info_span!("ibe::encrypt", scheme = scheme.as_str(), round = round_number)
        .in_scope(|| ibe::encrypt(scheme, public_key_bytes, &id, message))?;

    dst.write_all(&ct.to_bytes())
        .map_err(|_| Error::Internal("failed writing ciphertext"))?;
    Ok(())
}

/// Decrypts a ciphertext produced by [`encrypt`], given the beacon
/// signature for the round it was bound to.
///
/// ```rust
/// let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();
/// let encrypted = hex::decode("9787b5ed1c3e36e84ce19064e975be835b81c0788d5aa2a49ab7edc98b2917f1d61ac21f196bdc693ed556194fb33da104ffafa3c036dbcfb55eb953aaf2d446871aad7a1266f531caac1d654247a2d8ee93b975a7a19f0286f44d3c646d76338f334f4450bddbb2db52daae55d9e20ec26503ea7855b165f713b4ea96e60376").unwrap();
///
/// let mut decrypted = vec![];
/// tlock::decrypt(&mut decrypted, encrypted.as_slice(), tlock::SchemeId::PedersenBlsUnchained, &signature).unwrap();
/// ```
pub fn decrypt<W: Write, R: Read>(
    mut dst: W,
    mut src: R,
    scheme: SchemeId,
    signature: &[u8],
) -> Result<()> {
    let mut buf = Vec::new();
    src.read_to_end(&mut buf)
        .map_err(|_| Error::Internal("failed reading ciphertext"))?;
    let ct = Ciphertext::from_bytes(scheme, &buf)?;

    let pt = info_span!("ibe::decrypt", scheme = scheme.as_str())
        .in_scope(|| ibe::decrypt(scheme, signature, &ct))?;

    dst.write_all(&pt)
        .map_err(|_| Error::Internal("failed writing plaintext"))?;
    Ok(())
}

fn read_exact_or_zero_padded<R: Read>(src: &mut R, buf: &mut [u8; 16]) -> Result<()> {
    let mut cursor = 0;
    loop {
        match src.read(&mut buf[cursor..]) {
            Ok(0) => break,
            Ok(n) => cursor += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return Err(Error::Internal("failed reading message")),
        }
        if cursor == buf.len() {
            break;
        }
    }
    Ok(())
}
