use thiserror::Error;

/// Errors produced by the IBE core.
///
/// This mirrors the subset of the crate-wide error taxonomy that the
/// Boneh-Franklin primitives can themselves raise; callers further up the
/// stack (`tlock_age`) fold these into their own error type.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// A point was not a valid compressed encoding, not on the curve, or not
    /// in the prime-order subgroup; or a ciphertext component had the wrong
    /// length for the selected scheme.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(&'static str),

    /// The correctness check `U == r'.G` failed on decrypt.
    #[error("decryption failed correctness check")]
    Decryption,

    /// `scheme_id` is not one of the three recognized identifiers.
    #[error("unsupported scheme id: {0}")]
    UnsupportedScheme(String),

    /// The platform CSPRNG failed, or rejection sampling did not converge.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
