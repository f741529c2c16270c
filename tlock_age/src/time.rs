//! Round/time conversions and the external beacon-network interface.
//!
//! This module is pure arithmetic plus a small consumed trait; it has no
//! network or curve-math dependency of its own.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Chain metadata needed to pick an IBE variant and convert between round
/// numbers and wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub scheme_id: tlock::SchemeId,
    pub period_seconds: u64,
    pub genesis_time_unix: u64,
    pub chain_hash: Vec<u8>,
    pub public_key_bytes: Vec<u8>,
}

impl ChainInfo {
    pub fn new(
        scheme_id: &str,
        period_seconds: u64,
        genesis_time_unix: u64,
        chain_hash: Vec<u8>,
        public_key_bytes: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            scheme_id: tlock::SchemeId::from_str(scheme_id)?,
            period_seconds,
            genesis_time_unix,
            chain_hash,
            public_key_bytes,
        })
    }
}

/// A `(round, signature)` pair published by the beacon network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beacon {
    pub round: u64,
    pub signature: Vec<u8>,
}

/// The core's only external collaborator: fetches chain metadata and
/// per-round signatures. Implementations may be backed by `drand_core` or
/// any other client; the core imposes no transport or async runtime.
pub trait BeaconClient {
    fn chain_info(&self) -> Result<ChainInfo>;
    fn fetch_beacon(&self, round: u64) -> Result<Beacon>;
}

/// The wall-clock time at which `round` is scheduled to be published.
pub fn time_for_round(chain: &ChainInfo, round: u64) -> u64 {
    chain.genesis_time_unix + round.saturating_sub(1) * chain.period_seconds
}

/// The next round scheduled at or after `t`. `t <= genesis_time` yields
/// round 1; an exact boundary yields the boundary round.
pub fn round_for_time(chain: &ChainInfo, t: u64) -> u64 {
    if t <= chain.genesis_time_unix {
        return 1;
    }
    (t - chain.genesis_time_unix) / chain.period_seconds + 1
}

/// Returns `Err(Error::TooEarly)` if `round` has not yet unlocked as of
/// `now` (unix seconds).
pub fn require_unlocked(chain: &ChainInfo, round: u64, now: u64) -> Result<()> {
    let unlock_at = time_for_round(chain, round);
    if now < unlock_at {
        return Err(Error::TooEarly { round, unlock_at });
    }
    Ok(())
}
