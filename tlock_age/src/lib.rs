//! # tlock_age
//!
//! tlock_age wraps [`tlock`](https://docs.rs/tlock)'s identity-based
//! timelock encryption in the [AGE](https://age-encryption.org/v1) file
//! format: the file key is encrypted to a future drand round inside a
//! `tlock` recipient stanza, the header is authenticated with an
//! HKDF-derived HMAC, and the payload is sealed in 64 KiB STREAM chunks
//! of ChaCha20-Poly1305.
//!
//! As with `tlock`, the drand client is not baked into the library: the
//! caller supplies chain metadata and beacon signatures, either directly
//! (`encrypt`/`decrypt`) or through a [`BeaconClient`] (`encrypt_for_round`/`decrypt_via_client`).
//!
//! ## Example
//!
//! For a working example, refer to [examples/encrypt_decrypt.rs](../examples/encrypt_decrypt.rs).

pub mod armor;
mod error;
mod header;
mod noop_stanza;
mod stream;
mod time;
mod tlock_stanza;

pub use error::{Error, Result};
pub use header::Stanza;
pub use time::{Beacon, BeaconClient, ChainInfo};
pub use tlock::SchemeId;

use header::Header as AgeHeader;
use rand::RngCore;
use std::io::{Read, Write};
use tracing::info_span;
use zeroize::Zeroize;

fn maybe_dearmor(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.starts_with(b"-----BEGIN AGE ENCRYPTED FILE-----") {
        armor::dearmor(bytes)
    } else {
        Ok(bytes.to_vec())
    }
}

fn encrypt_with_wrap<W: Write>(
    mut dst: W,
    plaintext: &[u8],
    wrap: impl FnOnce(&[u8; 16]) -> Result<Stanza>,
) -> Result<()> {
    let mut file_key = [0u8; 16];
    rand::rng().fill_bytes(&mut file_key);

    let stanza = wrap(&file_key)?;
    let age_header = AgeHeader {
        stanzas: vec![stanza],
    };
    let prefix = header::encode_prefix(&age_header)?;
    let mac = header::compute_mac(&header::header_mac_key(&file_key), &prefix);
    let header_bytes = header::encode(&age_header, &mac)?;

    let mut payload_nonce = [0u8; 16];
    rand::rng().fill_bytes(&mut payload_nonce);
    let mut payload_key = header::payload_key(&file_key, &payload_nonce);
    let sealed = stream::seal(plaintext, &payload_key)?;
    payload_key.zeroize();

    dst.write_all(&header_bytes)
        .map_err(|_| Error::Internal("failed writing header"))?;
    dst.write_all(&payload_nonce)
        .map_err(|_| Error::Internal("failed writing payload nonce"))?;
    dst.write_all(&sealed)
        .map_err(|_| Error::Internal("failed writing payload"))?;

    file_key.zeroize();
    Ok(())
}

fn decrypt_with_unwrap<W: Write>(
    mut dst: W,
    ciphertext: &[u8],
    unwrap: impl FnOnce(&[Stanza]) -> Result<[u8; 16]>,
) -> Result<()> {
    let parsed = header::parse(ciphertext)?;
    let mut file_key = unwrap(&parsed.header.stanzas)?;
    header::verify_mac(
        &header::header_mac_key(&file_key),
        &parsed.mac_input,
        &parsed.mac,
    )?;

    let body = &ciphertext[parsed.body_offset..];
    if body.len() < 16 {
        file_key.zeroize();
        return Err(Error::InputValidation(
            "payload is shorter than the payload nonce",
        ));
    }
    let payload_nonce: [u8; 16] = body[..16].try_into().expect("checked length above");
    let mut payload_key = header::payload_key(&file_key, &payload_nonce);
    let plaintext = stream::open(&body[16..], &payload_key)?;
    payload_key.zeroize();

    dst.write_all(&plaintext)
        .map_err(|_| Error::Internal("failed writing plaintext"))?;
    file_key.zeroize();
    Ok(())
}

/// Encrypts `src` using tlock and age encryption, writing the result to
/// `dst`. `round` and `chain_hash` are stored in the age header in the
/// clear; `public_key_bytes` must match `scheme`.
///
/// To armor the output so it's ASCII-printable, wrap `dst` in
/// [`armor::ArmoredWriter`].
///
/// ```rust
/// let chain_hash = hex::decode("dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493").unwrap();
/// let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
/// let round = 1000;
/// let src = vec![0u8; 100];
///
/// let mut encrypted = vec![];
/// tlock_age::encrypt(&mut encrypted, &*src, tlock_age::SchemeId::PedersenBlsUnchained, &chain_hash, &pk_bytes, round).unwrap();
/// ```
pub fn encrypt<W: Write, R: Read>(
    dst: W,
    mut src: R,
    scheme: SchemeId,
    chain_hash: &[u8],
    public_key_bytes: &[u8],
    round: u64,
) -> Result<()> {
    let chain = ChainInfo {
        scheme_id: scheme,
        period_seconds: 0,
        genesis_time_unix: 0,
        chain_hash: chain_hash.to_vec(),
        public_key_bytes: public_key_bytes.to_vec(),
    };
    let mut plaintext = Vec::new();
    src.read_to_end(&mut plaintext)
        .map_err(|_| Error::Internal("failed reading plaintext"))?;

    info_span!("tlock_age::encrypt", round).in_scope(|| {
        encrypt_with_wrap(dst, &plaintext, |file_key| {
            tlock_stanza::wrap(file_key, round, &chain)
        })
    })
}

/// Round/chain-hash information stored in a tlock_age header, readable
/// before decryption is possible (no signature is required).
pub struct Header {
    round: u64,
    hash: Vec<u8>,
}

impl Header {
    /// Round the message is encrypted to.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Hash of the chain used to encrypt the message.
    pub fn hash(&self) -> Vec<u8> {
        self.hash.clone()
    }
}

/// Reads the round and chain hash out of an age header without attempting
/// decryption. `src` may be armored or not.
///
/// ```rust
/// let encrypted = "-----BEGIN AGE ENCRYPTED FILE-----
/// YWdlLWVuY3J5cHRpb24ub3JnL3YxCi0+IHRsb2NrIDEwMDAgZGJkNTA2ZDZlZjc2
/// ZTVmMzg2ZjQxYzY1MWRjYjgwOGM1YmNiZDc1NDcxY2M0ZWFmYTNmNGRmN2FkNGU0
/// YzQ5Mwo2QWVPcXlMcE5GUmRyTk9XcS9scDFHbWhhakplSWtGdmYzZThIL3VsdlNU
/// WFo3bHhMeisycStyTW0yRzBtaEdoClNXWVVZZC84MTYxdUV5cTRXMFB3ais5c0xM
/// akhNd3BJMFdUTVhoaG53THVWYzljZFlxc1R2RkNmbWpQTytmVnQKNVNpZnVMVWNn
/// WTBrR2JZRiszRFp1eStTR3ozOHJjTFM4Y21wNHpRNVlXT0dFOHpVeEhtaUhPMzhm
/// RHlMWTNwZAptN256Nlp1MjR6U1VSenZIcWRKVXUzdGQKLT4gc3NqS2gyMy1ncmVh
/// c2UgS1ggS283WlhMIEdBCjFUalZlTEVmUHZqMTZrbEplU2ZHeUM5OUxHbzRvNzZs
/// ZUlFRWxnbFdqOTJKOVhrZFBOS1ROZwotLS0gZnhIWTQwY0lCelRrbTFaMUY5RFRw
/// SkFPeDJYa1Y5czhFVm9jODNvNmx5TQrSL7z9BSDN1fPTJHR/+NDn0XsRFbPcP+++
/// Bf7YA4hqATSUNeJxOGG+4WSPZVYTXea3DBSsrujyLkushPfoIQVxE4AmObY6UoAP
/// /2FMDd47MXZpbqC1PaWCqbD059E5l31kKwWQTU1zVeCamPFIlfn6ToBhtvqaiinP
/// OVD1guHTIEKPjA4=
/// -----END AGE ENCRYPTED FILE-----".as_bytes();
///
/// let header = tlock_age::decrypt_header(encrypted).unwrap();
/// assert_eq!(header.round(), 1000);
/// ```
pub fn decrypt_header<R: Read>(mut src: R) -> Result<Header> {
    let mut bytes = Vec::new();
    src.read_to_end(&mut bytes)
        .map_err(|_| Error::Internal("failed reading header"))?;
    let bytes = maybe_dearmor(&bytes)?;

    let parsed = header::parse(&bytes)?;
    let (round, hash) = tlock_stanza::header_info(&parsed.header.stanzas)?;
    Ok(Header { round, hash })
}

/// Decrypts an age file produced by [`encrypt`]. `signature` must be the
/// beacon signature for the round stored in the header; `src` may be
/// armored or not, decryption supports both.
///
/// ```rust
/// let chain_hash = hex::decode("dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493").unwrap();
/// let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();
///
/// let encrypted = "-----BEGIN AGE ENCRYPTED FILE-----
/// YWdlLWVuY3J5cHRpb24ub3JnL3YxCi0+IHRsb2NrIDEwMDAgZGJkNTA2ZDZlZjc2
/// ZTVmMzg2ZjQxYzY1MWRjYjgwOGM1YmNiZDc1NDcxY2M0ZWFmYTNmNGRmN2FkNGU0
/// YzQ5Mwo2QWVPcXlMcE5GUmRyTk9XcS9scDFHbWhhakplSWtGdmYzZThIL3VsdlNU
/// WFo3bHhMeisycStyTW0yRzBtaEdoClNXWVVZZC84MTYxdUV5cTRXMFB3ais5c0xM
/// akhNd3BJMFdUTVhoaG53THVWYzljZFlxc1R2RkNmbWpQTytmVnQKNVNpZnVMVWNn
/// WTBrR2JZRiszRFp1eStTR3ozOHJjTFM4Y21wNHpRNVlXT0dFOHpVeEhtaUhPMzhm
/// RHlMWTNwZAptN256Nlp1MjR6U1VSenZIcWRKVXUzdGQKLT4gc3NqS2gyMy1ncmVh
/// c2UgS1ggS283WlhMIEdBCjFUalZlTEVmUHZqMTZrbEplU2ZHeUM5OUxHbzRvNzZs
/// ZUlFRWxnbFdqOTJKOVhrZFBOS1ROZwotLS0gZnhIWTQwY0lCelRrbTFaMUY5RFRw
/// SkFPeDJYa1Y5czhFVm9jODNvNmx5TQrSL7z9BSDN1fPTJHR/+NDn0XsRFbPcP+++
/// Bf7YA4hqATSUNeJxOGG+4WSPZVYTXea3DBSsrujyLkushPfoIQVxE4AmObY6UoAP
/// /2FMDd47MXZpbqC1PaWCqbD059E5l31kKwWQTU1zVeCamPFIlfn6ToBhtvqaiinP
/// OVD1guHTIEKPjA4=
/// -----END AGE ENCRYPTED FILE-----".as_bytes();
///
/// let mut decrypted = vec![];
/// tlock_age::decrypt(&mut decrypted, encrypted, tlock_age::SchemeId::PedersenBlsUnchained, &chain_hash, &signature).unwrap();
/// ```
pub fn decrypt<W: Write, R: Read>(
    dst: W,
    mut src: R,
    scheme: SchemeId,
    chain_hash: &[u8],
    signature: &[u8],
) -> Result<()> {
    let chain = ChainInfo {
        scheme_id: scheme,
        period_seconds: 0,
        genesis_time_unix: 0,
        chain_hash: chain_hash.to_vec(),
        public_key_bytes: vec![],
    };
    let mut bytes = Vec::new();
    src.read_to_end(&mut bytes)
        .map_err(|_| Error::Internal("failed reading ciphertext"))?;
    let bytes = maybe_dearmor(&bytes)?;

    info_span!("tlock_age::decrypt").in_scope(|| {
        decrypt_with_unwrap(dst, &bytes, |stanzas| {
            tlock_stanza::unwrap(stanzas, &chain, signature)
        })
    })
}

/// Encrypts for `round`, fetching chain metadata from `client` instead of
/// requiring the caller to pass `chain_hash`/`public_key_bytes` directly.
pub fn encrypt_for_round<W: Write, R: Read>(
    dst: W,
    mut src: R,
    round: u64,
    client: &dyn BeaconClient,
) -> Result<()> {
    let mut plaintext = Vec::new();
    src.read_to_end(&mut plaintext)
        .map_err(|_| Error::Internal("failed reading plaintext"))?;
    encrypt_with_wrap(dst, &plaintext, |file_key| {
        tlock_stanza::encrypt_wrapper(file_key, round, client)
    })
}

/// Decrypts an age file, fetching chain metadata and the round's beacon
/// signature from `client`. Fails with [`Error::TooEarly`] if the round
/// has not unlocked as of `now_unix` (unix seconds).
pub fn decrypt_via_client<W: Write, R: Read>(
    dst: W,
    mut src: R,
    client: &dyn BeaconClient,
    now_unix: u64,
) -> Result<()> {
    let mut bytes = Vec::new();
    src.read_to_end(&mut bytes)
        .map_err(|_| Error::Internal("failed reading ciphertext"))?;
    let bytes = maybe_dearmor(&bytes)?;
    decrypt_with_unwrap(dst, &bytes, |stanzas| {
        tlock_stanza::decrypt_wrapper(stanzas, client, now_unix)
    })
}

/// Encrypts with the `no-op` stanza instead of `tlock`: the file key is
/// stored in the clear in the header. For tests and local debugging only.
pub fn encrypt_noop<W: Write, R: Read>(dst: W, mut src: R) -> Result<()> {
    let mut plaintext = Vec::new();
    src.read_to_end(&mut plaintext)
        .map_err(|_| Error::Internal("failed reading plaintext"))?;
    encrypt_with_wrap(dst, &plaintext, |file_key| Ok(noop_stanza::wrap(file_key)))
}

/// Decrypts a `no-op`-wrapped age file produced by [`encrypt_noop`].
pub fn decrypt_noop<W: Write, R: Read>(dst: W, mut src: R) -> Result<()> {
    let mut bytes = Vec::new();
    src.read_to_end(&mut bytes)
        .map_err(|_| Error::Internal("failed reading ciphertext"))?;
    decrypt_with_unwrap(dst, &bytes, |stanzas| noop_stanza::unwrap(stanzas))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_roundtrip_at_boundary_sizes() {
        for len in [0, 1, 65535, 65536, 65537] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let mut encrypted = vec![];
            encrypt_noop(&mut encrypted, plaintext.as_slice()).unwrap();

            let mut decrypted = vec![];
            decrypt_noop(&mut decrypted, encrypted.as_slice()).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn noop_header_tamper_fails_authentication() {
        let mut encrypted = vec![];
        encrypt_noop(&mut encrypted, b"tlock".as_slice()).unwrap();
        let idx = encrypted.len() / 2;
        encrypted[idx] ^= 1;

        let mut decrypted = vec![];
        let err = decrypt_noop(&mut decrypted, encrypted.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Authentication | Error::InputValidation(_)));
    }

    #[test]
    fn tlock_roundtrip_and_header_readback() {
        let chain_hash = hex::decode(
            "dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493",
        )
        .unwrap();
        let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
        let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();

        let msg = b"hello world".to_vec();
        let mut encrypted = vec![];
        encrypt(
            &mut encrypted,
            msg.as_slice(),
            SchemeId::PedersenBlsUnchained,
            &chain_hash,
            &pk_bytes,
            1000,
        )
        .unwrap();

        let header = decrypt_header(encrypted.as_slice()).unwrap();
        assert_eq!(header.round(), 1000);
        assert_eq!(header.hash(), chain_hash);

        let mut decrypted = vec![];
        decrypt(
            &mut decrypted,
            encrypted.as_slice(),
            SchemeId::PedersenBlsUnchained,
            &chain_hash,
            &signature,
        )
        .unwrap();
        assert_eq!(decrypted, msg);
    }

    #[test]
    fn armored_roundtrip() {
        let chain_hash = hex::decode(
            "dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493",
        )
        .unwrap();
        let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
        let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();

        let msg = b"hello world".to_vec();
        let mut armored = armor::ArmoredWriter::wrap_output(vec![]);
        encrypt(
            &mut armored,
            msg.as_slice(),
            SchemeId::PedersenBlsUnchained,
            &chain_hash,
            &pk_bytes,
            1000,
        )
        .unwrap();
        let encrypted = armored.finish().unwrap();

        let mut decrypted = vec![];
        decrypt(
            &mut decrypted,
            encrypted.as_slice(),
            SchemeId::PedersenBlsUnchained,
            &chain_hash,
            &signature,
        )
        .unwrap();
        assert_eq!(decrypted, msg);
    }
}
