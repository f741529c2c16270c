//! The AGE header: version line, recipient stanzas, HMAC footer.
//!
//! Parsing and serialization operate on the literal header bytes so that
//! the HMAC can be computed over the exact canonical prefix (`"age-encryption.org/v1\n"`
//! through the literal `"---"`, no trailing space or newline).

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use base64::Engine;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;

const VERSION_LINE: &str = "age-encryption.org/v1";
const STANZA_BODY_LINE_LEN: usize = 64;

/// One recipient record in the header: a `type` token, zero or more
/// argument tokens, and an opaque body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    pub tag: String,
    pub args: Vec<String>,
    pub body: Vec<u8>,
}

/// An ordered list of recipient stanzas, pre-MAC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub stanzas: Vec<Stanza>,
}

/// A parsed header plus the framing needed to continue reading the body.
pub struct ParsedHeader {
    pub header: Header,
    pub mac: [u8; 32],
    /// Byte offset into the buffer handed to [`parse`], immediately after
    /// the newline terminating the `"--- <mac>"` line.
    pub body_offset: usize,
    /// The exact bytes `"age-encryption.org/v1\n"` through the literal
    /// `"---"`, the range the header MAC is computed over.
    pub mac_input: Vec<u8>,
}

fn validate_token(s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(Error::InputValidation("empty stanza token"));
    }
    if s.bytes().any(|b| !(33..=126).contains(&b)) {
        return Err(Error::InputValidation(
            "stanza token contains non-printable-ASCII byte",
        ));
    }
    Ok(())
}

fn next_line(bytes: &[u8], pos: usize) -> Result<(&str, usize)> {
    let rel = bytes[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(Error::InputValidation("unterminated header line"))?;
    let line = std::str::from_utf8(&bytes[pos..pos + rel])
        .map_err(|_| Error::InputValidation("header line is not valid utf-8"))?;
    Ok((line, pos + rel + 1))
}

fn encode_stanza(out: &mut Vec<u8>, s: &Stanza) -> Result<()> {
    validate_token(&s.tag)?;
    for a in &s.args {
        validate_token(a)?;
    }
    out.extend_from_slice(b"-> ");
    out.extend_from_slice(s.tag.as_bytes());
    for a in &s.args {
        out.push(b' ');
        out.extend_from_slice(a.as_bytes());
    }
    out.push(b'\n');

    let b64 = B64.encode(&s.body);
    for chunk in b64.as_bytes().chunks(STANZA_BODY_LINE_LEN) {
        out.extend_from_slice(chunk);
        out.push(b'\n');
    }
    if b64.len() % STANZA_BODY_LINE_LEN == 0 {
        out.push(b'\n');
    }
    Ok(())
}

/// Encodes the canonical header prefix: version line, stanzas, and the
/// literal `"---"` terminator - everything the MAC is computed over.
pub fn encode_prefix(header: &Header) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(VERSION_LINE.as_bytes());
    out.push(b'\n');
    for s in &header.stanzas {
        encode_stanza(&mut out, s)?;
    }
    out.extend_from_slice(b"---");
    Ok(out)
}

/// Encodes the full header, with the HMAC appended to the terminator line.
pub fn encode(header: &Header, mac: &[u8; 32]) -> Result<Vec<u8>> {
    let mut out = encode_prefix(header)?;
    out.push(b' ');
    out.extend_from_slice(B64.encode(mac).as_bytes());
    out.push(b'\n');
    Ok(out)
}

/// Parses a header out of the front of `bytes`. `bytes` may contain
/// trailing payload data after the header; only the header is consumed.
pub fn parse(bytes: &[u8]) -> Result<ParsedHeader> {
    let (first, mut pos) = next_line(bytes, 0)?;
    if first != VERSION_LINE {
        return Err(Error::ProtocolError("unexpected age version line"));
    }

    let mut stanzas = Vec::new();
    loop {
        let (line, next_pos) = next_line(bytes, pos)?;
        if let Some(rest) = line.strip_prefix("-> ") {
            let mut parts = rest.split(' ');
            let tag = parts
                .next()
                .ok_or(Error::ProtocolError("stanza missing type"))?;
            validate_token(tag)?;
            let mut args = Vec::new();
            for a in parts {
                validate_token(a)?;
                args.push(a.to_string());
            }

            pos = next_pos;
            let mut body_b64 = String::new();
            loop {
                let (body_line, after) = next_line(bytes, pos)?;
                body_b64.push_str(body_line);
                pos = after;
                if body_line.len() < STANZA_BODY_LINE_LEN {
                    break;
                }
            }
            let body = B64
                .decode(body_b64.as_bytes())
                .map_err(|_| Error::InputValidation("stanza body is not valid base64"))?;
            stanzas.push(Stanza {
                tag: tag.to_string(),
                args,
                body,
            });
        } else if let Some(rest) = line.strip_prefix("--- ") {
            let mac_bytes = B64
                .decode(rest.as_bytes())
                .map_err(|_| Error::InputValidation("header mac is not valid base64"))?;
            let mac: [u8; 32] = mac_bytes
                .try_into()
                .map_err(|_| Error::InputValidation("header mac has the wrong length"))?;
            return Ok(ParsedHeader {
                header: Header { stanzas },
                mac,
                body_offset: next_pos,
                mac_input: bytes[..pos + b"---".len()].to_vec(),
            });
        } else {
            return Err(Error::ProtocolError(
                "expected a stanza line or the header terminator",
            ));
        }
    }
}

fn hkdf_expand(ikm: &[u8], salt: &[u8], info: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut out = [0u8; 32];
    hk.expand(info, &mut out)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    out
}

/// `HKDF-SHA256(IKM=file_key, salt=∅, info="header")`.
pub fn header_mac_key(file_key: &[u8; 16]) -> [u8; 32] {
    hkdf_expand(file_key, b"", b"header")
}

/// `HKDF-SHA256(IKM=file_key, salt=payload_nonce, info="payload")`.
pub fn payload_key(file_key: &[u8; 16], payload_nonce: &[u8; 16]) -> [u8; 32] {
    hkdf_expand(file_key, payload_nonce, b"payload")
}

/// HMAC-SHA256 over `data`, keyed by `key`.
pub fn compute_mac(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time verification of a header MAC.
pub fn verify_mac(key: &[u8; 32], data: &[u8], mac: &[u8; 32]) -> Result<()> {
    let mut verifier =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    verifier.update(data);
    verifier
        .verify_slice(mac)
        .map_err(|_| Error::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stanza_roundtrips_through_encode_and_parse() {
        let header = Header {
            stanzas: vec![
                Stanza {
                    tag: "tlock".to_string(),
                    args: vec!["100".to_string(), "abcd".to_string()],
                    body: vec![1, 2, 3, 4, 5],
                },
                Stanza {
                    tag: "no-op".to_string(),
                    args: vec![],
                    body: vec![9u8; 16],
                },
            ],
        };
        let key = [3u8; 32];
        let prefix = encode_prefix(&header).unwrap();
        let mac = compute_mac(&key, &prefix);
        let full = encode(&header, &mac).unwrap();

        let parsed = parse(&full).unwrap();
        assert_eq!(parsed.header, header);
        assert_eq!(parsed.mac, mac);
        assert_eq!(parsed.mac_input, prefix);
        assert_eq!(parsed.body_offset, full.len());
        verify_mac(&key, &parsed.mac_input, &parsed.mac).unwrap();
    }

    #[test]
    fn body_exactly_64_base64_chars_gets_trailing_empty_line() {
        let body = vec![0u8; 48]; // base64 of 48 bytes is 64 chars, no padding
        let header = Header {
            stanzas: vec![Stanza {
                tag: "no-op".to_string(),
                args: vec![],
                body,
            }],
        };
        let prefix = encode_prefix(&header).unwrap();
        let text = String::from_utf8(prefix).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.last(), Some(&""));
    }

    #[test]
    fn tampering_with_body_fails_mac_verification() {
        let header = Header {
            stanzas: vec![Stanza {
                tag: "tlock".to_string(),
                args: vec!["1".to_string(), "ab".to_string()],
                body: vec![42u8; 32],
            }],
        };
        let key = [5u8; 32];
        let prefix = encode_prefix(&header).unwrap();
        let mac = compute_mac(&key, &prefix);
        let mut full = encode(&header, &mac).unwrap();
        let idx = full.iter().position(|&b| b == b'\n').unwrap() + 10;
        full[idx] ^= 1;

        let parsed = parse(&full).unwrap();
        assert!(verify_mac(&key, &parsed.mac_input, &parsed.mac).is_err());
    }

    #[test]
    fn non_printable_token_is_rejected() {
        assert!(validate_token("has space").is_err());
        assert!(validate_token("").is_err());
        assert!(validate_token("tlock").is_ok());
    }

    #[test]
    fn wrong_version_line_is_rejected() {
        let err = parse(b"age-encryption.org/v2\n---  \n").unwrap_err();
        assert!(matches!(err, Error::ProtocolError(_)));
    }
}
