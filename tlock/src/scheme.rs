use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which of the two BLS12-381 groups a point lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    G1,
    G2,
}

/// One of the three drand chain schemes tlock can target.
///
/// Two of the three (`BlsUnchainedOnG1` and `BlsUnchainedG1Rfc9380`) share a
/// master-key group and an identity group; they differ only in the
/// hash-to-curve domain-separation tag used to derive the round identity,
/// so the encrypt/decrypt code path is shared (see [`Self::id_dst`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeId {
    /// Master public key on G2, round identities hashed onto G1.
    PedersenBlsUnchained,
    /// Master public key on G1, round identities hashed onto G2, legacy DST.
    /// Accepted on decrypt for backward compatibility; not emitted for new
    /// ciphertexts (see design note in the crate's SPEC_FULL.md).
    BlsUnchainedOnG1,
    /// Master public key on G1, round identities hashed onto G2, RFC 9380 DST.
    BlsUnchainedG1Rfc9380,
}

/// RFC 9380 DSTs, matching the external drand beacon network bit-for-bit.
const G1_DST_RFC9380: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";
const G2_DST_RFC9380: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";
/// Pre-RFC9380 DST retained only so `bls-unchained-on-g1` ciphertexts minted
/// before chains migrated can still be decrypted.
const G2_DST_LEGACY: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_";

impl SchemeId {
    pub const ALL: [SchemeId; 3] = [
        SchemeId::PedersenBlsUnchained,
        SchemeId::BlsUnchainedOnG1,
        SchemeId::BlsUnchainedG1Rfc9380,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeId::PedersenBlsUnchained => "pedersen-bls-unchained",
            SchemeId::BlsUnchainedOnG1 => "bls-unchained-on-g1",
            SchemeId::BlsUnchainedG1Rfc9380 => "bls-unchained-g1-rfc9380",
        }
    }

    /// The group the chain's distributed public key (and `U`) lives in.
    pub fn master_group(&self) -> Group {
        match self {
            SchemeId::PedersenBlsUnchained => Group::G2,
            SchemeId::BlsUnchainedOnG1 | SchemeId::BlsUnchainedG1Rfc9380 => Group::G1,
        }
    }

    /// The group round identities (and beacon signatures) live in: always
    /// the group opposite `master_group`.
    pub fn id_group(&self) -> Group {
        match self.master_group() {
            Group::G1 => Group::G2,
            Group::G2 => Group::G1,
        }
    }

    /// Domain-separation tag used when hashing a round identity onto
    /// `id_group`.
    pub fn id_dst(&self) -> &'static [u8] {
        match self {
            SchemeId::PedersenBlsUnchained => G1_DST_RFC9380,
            SchemeId::BlsUnchainedG1Rfc9380 => G2_DST_RFC9380,
            SchemeId::BlsUnchainedOnG1 => G2_DST_LEGACY,
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pedersen-bls-unchained" => Ok(SchemeId::PedersenBlsUnchained),
            "bls-unchained-on-g1" => Ok(SchemeId::BlsUnchainedOnG1),
            "bls-unchained-g1-rfc9380" => Ok(SchemeId::BlsUnchainedG1Rfc9380),
            other => Err(Error::UnsupportedScheme(other.to_owned())),
        }
    }
}
