//! Byte-oriented AES-256 with seven block chaining modes and an
//! AES-CTR pseudo-random generator for IV material.
//!
//! The cipher primitive lives in [`AesCore`], the S-box tables in
//! [`sbox`], the fixed-size byte arithmetic in [`Block`], padding
//! policies in [`padding`], whole-message chaining in [`Engine`] and
//! the PRNG in [`CtrPrng`].

mod aes;
mod block;
mod engine;
mod error;
mod padding;
mod prng;
mod sbox;

#[cfg(test)]
mod tests;

pub use aes::AesCore;
pub use block::{Block, Block16, Block32};
pub use engine::{BlockMode, Engine};
pub use error::Error;
pub use padding::PaddingMode;
pub use prng::CtrPrng;
