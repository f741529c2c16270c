//! Translates `(round, chain)` into/out of a `tlock` AGE recipient stanza,
//! calling into `tlock`'s IBE core and the beacon client.

use crate::error::{Error, Result};
use crate::header::Stanza;
use crate::time::{self, BeaconClient, ChainInfo};

pub const STANZA_TAG: &str = "tlock";

/// Wraps `file_key` for `round` under `chain`, returning a single stanza.
pub fn wrap(file_key: &[u8; 16], round: u64, chain: &ChainInfo) -> Result<Stanza> {
    if round < 1 {
        return Err(Error::InputValidation("round must be >= 1"));
    }
    let mut body = Vec::new();
    tlock::encrypt(
        &mut body,
        &file_key[..],
        chain.scheme_id,
        &chain.public_key_bytes,
        round,
    )?;
    Ok(Stanza {
        tag: STANZA_TAG.to_string(),
        args: vec![round.to_string(), hex::encode(&chain.chain_hash)],
        body,
    })
}

/// Extracts `(round, chain_hash)` from the unique `tlock` stanza among
/// `stanzas`, without touching any key material.
pub fn header_info(stanzas: &[Stanza]) -> Result<(u64, Vec<u8>)> {
    let stanza = single_tlock_stanza(stanzas)?;
    parse_args(stanza)
}

fn single_tlock_stanza(stanzas: &[Stanza]) -> Result<&Stanza> {
    let mut found = stanzas.iter().filter(|s| s.tag == STANZA_TAG);
    let stanza = found
        .next()
        .ok_or(Error::ProtocolError("expected a tlock stanza, found none"))?;
    if found.next().is_some() {
        return Err(Error::ProtocolError("expected exactly one tlock stanza"));
    }
    Ok(stanza)
}

fn parse_args(stanza: &Stanza) -> Result<(u64, Vec<u8>)> {
    if stanza.args.len() != 2 {
        return Err(Error::ProtocolError("tlock stanza expects 2 args"));
    }
    let round: u64 = stanza.args[0]
        .parse()
        .map_err(|_| Error::ProtocolError("tlock round arg is not numeric"))?;
    let chain_hash = hex::decode(&stanza.args[1])
        .map_err(|_| Error::InputValidation("tlock chain hash arg is not hex"))?;
    Ok((round, chain_hash))
}

/// Unwraps the file key given the beacon signature for the stanza's round.
pub fn unwrap(stanzas: &[Stanza], chain: &ChainInfo, signature: &[u8]) -> Result<[u8; 16]> {
    let stanza = single_tlock_stanza(stanzas)?;
    let (_round, chain_hash) = parse_args(stanza)?;
    if chain_hash != chain.chain_hash {
        return Err(Error::ProtocolError("tlock stanza chain hash mismatch"));
    }

    let mut file_key = Vec::new();
    tlock::decrypt(
        &mut file_key,
        stanza.body.as_slice(),
        chain.scheme_id,
        signature,
    )?;
    file_key
        .try_into()
        .map_err(|_| Error::InvalidCiphertext("decrypted file key has the wrong length"))
}

/// `wrap`, driven by a [`BeaconClient`] for chain metadata.
pub fn encrypt_wrapper(
    file_key: &[u8; 16],
    round: u64,
    client: &dyn BeaconClient,
) -> Result<Stanza> {
    let chain = client.chain_info()?;
    wrap(file_key, round, &chain)
}

/// `unwrap`, driven by a [`BeaconClient`] for chain metadata and the round
/// signature. Rejects with [`Error::TooEarly`] if the round hasn't
/// unlocked yet as of `now_unix`.
pub fn decrypt_wrapper(
    stanzas: &[Stanza],
    client: &dyn BeaconClient,
    now_unix: u64,
) -> Result<[u8; 16]> {
    let chain = client.chain_info()?;
    let (round, chain_hash) = header_info(stanzas)?;
    if chain_hash != chain.chain_hash {
        return Err(Error::ProtocolError("tlock stanza chain hash mismatch"));
    }
    time::require_unlocked(&chain, round, now_unix)?;

    let beacon = client.fetch_beacon(round)?;
    unwrap(stanzas, &chain, &beacon.signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fastnet_chain() -> ChainInfo {
        ChainInfo::new(
            "pedersen-bls-unchained",
            3,
            1595431050,
            hex::decode("dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493").unwrap(),
            hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn wrap_unwrap_roundtrip() {
        let chain = fastnet_chain();
        let file_key = [4u8; 16];
        let stanza = wrap(&file_key, 1000, &chain).unwrap();

        let (round, hash) = header_info(std::slice::from_ref(&stanza)).unwrap();
        assert_eq!(round, 1000);
        assert_eq!(hash, chain.chain_hash);

        let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();
        let recovered = unwrap(std::slice::from_ref(&stanza), &chain, &signature).unwrap();
        assert_eq!(recovered, file_key);
    }

    #[test]
    fn wrong_round_signature_fails_authentication() {
        let chain = fastnet_chain();
        let file_key = [4u8; 16];
        let stanza = wrap(&file_key, 1000, &chain).unwrap();

        // corrupt a real signature so it's either off-curve or for the wrong round
        let mut wrong_signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();
        wrong_signature[10] ^= 0xff;
        let err = unwrap(std::slice::from_ref(&stanza), &chain, &wrong_signature).unwrap_err();
        assert!(matches!(err, Error::Authentication | Error::InvalidCiphertext(_)));
    }
}
