use thiserror::Error;

/// Errors returned by [`crate::Engine`], [`crate::Block`] and
/// [`crate::CtrPrng`] as reasons for a failed operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("[AES256-Error] key must contain at least 32 bytes, got {0}")]
    InvalidKey(usize),

    #[error("[AES256-Error] IV must contain at least 16 bytes, got {0}")]
    InvalidIv(usize),

    #[error("[AES256-Error] PRNG seed must contain at least 16 bytes, got {0}")]
    InvalidSeed(usize),

    #[error("[AES256-Error] unrecognised chaining mode: {0}")]
    InvalidMode(String),

    #[error("[AES256-Error] input length {got} is not valid for this mode (expected {expected})")]
    BadLength { got: usize, expected: &'static str },

    #[error("[AES256-Error] padding of decrypted block is garbled")]
    Garbled,

    #[error("[AES256-Error] block index {index} out of range for a {size}-byte block")]
    OutOfRange { index: usize, size: usize },

    #[error("[AES256-Error] stream I/O failed: {0}")]
    StreamError(#[from] std::io::Error),

    #[error("[AES256-Error] invalid hex: {0}")]
    HexError(#[from] hex::FromHexError),
}
