//! The fixed `no-op` stanza interpreter: stores the file key in the clear.
//!
//! Exists purely as a debug/test wrapper so header and STREAM round-trips
//! can be exercised without any curve math or beacon network. Never
//! emitted by the timelock-facing public API.

use crate::error::{Error, Result};
use crate::header::Stanza;

pub const STANZA_TAG: &str = "no-op";

pub fn wrap(file_key: &[u8; 16]) -> Stanza {
    Stanza {
        tag: STANZA_TAG.to_string(),
        args: vec![],
        body: file_key.to_vec(),
    }
}

pub fn unwrap(stanzas: &[Stanza]) -> Result<[u8; 16]> {
    let mut found = stanzas.iter().filter(|s| s.tag == STANZA_TAG);
    let stanza = found
        .next()
        .ok_or(Error::ProtocolError("expected a no-op stanza, found none"))?;
    if found.next().is_some() {
        return Err(Error::ProtocolError("expected exactly one no-op stanza"));
    }
    if !stanza.args.is_empty() {
        return Err(Error::ProtocolError("no-op stanza takes no args"));
    }
    stanza
        .body
        .clone()
        .try_into()
        .map_err(|_| Error::ProtocolError("no-op stanza body must be exactly 16 bytes"))
}
