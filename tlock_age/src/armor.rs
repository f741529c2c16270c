//! ASCII-armor envelope: wraps arbitrary AGE file bytes so they're safe to
//! paste into text contexts. No CRC footer, unlike OpenPGP armor.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::io::{self, Write};

const BEGIN_MARKER: &str = "-----BEGIN AGE ENCRYPTED FILE-----";
const END_MARKER: &str = "-----END AGE ENCRYPTED FILE-----";
const LINE_LEN: usize = 64;

/// Wraps `data` (a full AGE file's bytes) in the armor envelope.
pub fn armor(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(BEGIN_MARKER.as_bytes());
    out.push(b'\n');
    let b64 = B64.encode(data);
    for chunk in b64.as_bytes().chunks(LINE_LEN) {
        out.extend_from_slice(chunk);
        out.push(b'\n');
    }
    out.extend_from_slice(END_MARKER.as_bytes());
    out.push(b'\n');
    out
}

/// Recovers the original bytes from an armored input. Tolerates CR/LF and
/// trailing whitespace on the boundary and body lines; strict on the
/// base64 alphabet itself.
pub fn dearmor(input: &[u8]) -> Result<Vec<u8>> {
    let text =
        std::str::from_utf8(input).map_err(|_| Error::InputValidation("armor is not utf-8"))?;
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r').trim());

    let first = lines
        .next()
        .ok_or(Error::InputValidation("empty armor input"))?;
    if first != BEGIN_MARKER {
        return Err(Error::InputValidation("missing armor begin marker"));
    }

    let mut body = String::new();
    let mut saw_end = false;
    for line in lines {
        if line == END_MARKER {
            saw_end = true;
            break;
        }
        body.push_str(line);
    }
    if !saw_end {
        return Err(Error::InputValidation("missing armor end marker"));
    }

    B64.decode(body.as_bytes())
        .map_err(|_| Error::InputValidation("armor body is not valid base64"))
}

/// Applies [`armor`] to everything written to it once [`finish`](Self::finish)
/// is called. The whole payload is buffered in memory, matching the
/// library's in-memory processing model.
pub struct ArmoredWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> ArmoredWriter<W> {
    /// Wraps `inner` so that writes are armored on `finish`.
    pub fn wrap_output(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Applies the armor envelope to everything written and flushes it to
    /// the inner writer. You MUST call this when done writing; dropping
    /// without calling it discards the buffered plaintext.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.write_all(&armor(&self.buf))?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ArmoredWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_roundtrips() {
        let data: Vec<u8> = (0..500u32).map(|i| (i % 256) as u8).collect();
        let armored = armor(&data);
        let recovered = dearmor(&armored).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn dearmor_tolerates_crlf_and_trailing_whitespace() {
        let data = b"tlock".to_vec();
        let armored = armor(&data);
        let mut text = String::from_utf8(armored).unwrap();
        text = text.replace('\n', "\r\n ");
        let recovered = dearmor(text.as_bytes()).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn dearmor_rejects_missing_markers() {
        assert!(dearmor(b"not armor at all").is_err());
        assert!(dearmor(BEGIN_MARKER.as_bytes()).is_err());
    }
}
