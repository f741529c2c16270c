use thiserror::Error;

/// Errors surfaced by the AGE file-format layer and the timelock wrapper
/// built on top of `tlock`.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed AGE header, invalid stanza args, non-printable characters,
    /// or invalid base64.
    #[error("input validation: {0}")]
    InputValidation(&'static str),

    /// Stanza type mismatch, wrong arg count, wrong stanza count, or
    /// version-line mismatch.
    #[error("protocol error: {0}")]
    ProtocolError(&'static str),

    /// `scheme_id` is not one of the three recognized identifiers.
    #[error("unsupported scheme id: {0}")]
    UnsupportedScheme(String),

    /// Decryption was attempted before the beacon for the round exists.
    #[error("too early: round {round} unlocks at {unlock_at}")]
    TooEarly { round: u64, unlock_at: u64 },

    /// A failure surfaced by the beacon client.
    #[error("network error: {0}")]
    Network(String),

    /// Header MAC mismatch, a STREAM chunk tag failure, or an IBE
    /// correctness-check failure.
    #[error("authentication failed")]
    Authentication,

    /// A non-subgroup point, or a wrong-length IBE body for the selected
    /// scheme.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(&'static str),

    /// Counter overflow, CSPRNG failure, or any other invariant violation
    /// that isn't a caller mistake.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl From<tlock::Error> for Error {
    fn from(e: tlock::Error) -> Self {
        match e {
            tlock::Error::InvalidCiphertext(m) => Error::InvalidCiphertext(m),
            tlock::Error::Decryption => Error::Authentication,
            tlock::Error::UnsupportedScheme(s) => Error::UnsupportedScheme(s),
            tlock::Error::Internal(m) => Error::Internal(m),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
