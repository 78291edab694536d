//! CTR-mode pseudo-random generator built on the same AES-256 core as
//! the block cipher, modeled loosely on the construction described in
//! NIST SP 800-90A's CTR_DRBG. Not a vetted cryptographic generator —
//! suitable for IV generation under an external seed, nothing more.

use crate::aes::AesCore;
use crate::block::{Block, Block16, Block32};
use crate::error::Error;

const POOL_SIZE: usize = 64;

const DEFAULT_COUNTER: [u8; 16] = [
    0xd0, 0x73, 0xb0, 0xb1, 0xc7, 0xda, 0x04, 0xde, 0x58, 0x12, 0xa1, 0x4d, 0xf6, 0x4d, 0x0f, 0xd3,
];

const DEFAULT_KEY: [u8; 32] = [
    0x08, 0x11, 0x34, 0xe3, 0x73, 0x86, 0xc7, 0xc4, 0xd1, 0x24, 0x3c, 0xb0, 0x3c, 0xde, 0x0d, 0x73,
    0xea, 0xb2, 0xa6, 0x78, 0xb7, 0x0b, 0x01, 0x05, 0x62, 0x93, 0xee, 0x98, 0xe2, 0xff, 0x46, 0x2f,
];

/// Generates pseudo-random bytes by encrypting a running counter and
/// drawing from a 64-byte ring-buffer pool refilled four blocks at a
/// time.
pub struct CtrPrng {
    aes: AesCore,
    counter: Block16,
    pool: Block<POOL_SIZE>,
    low: usize,
    high: usize,
}

impl CtrPrng {
    /// The built-in default key and counter, unseeded.
    pub fn new() -> Self {
        CtrPrng {
            aes: AesCore::new(Block32::from_array(DEFAULT_KEY)),
            counter: Block16::from_array(DEFAULT_COUNTER),
            pool: Block::zero(),
            low: 0,
            high: 0,
        }
    }

    /// Seeds the counter by XOR-ing it with `seed` (at least 16 bytes;
    /// only the first 16 are used), keeping the default key.
    pub fn with_seed(seed: &[u8]) -> Result<Self, Error> {
        if seed.len() < 16 {
            return Err(Error::InvalidSeed(seed.len()));
        }
        let mut prng = CtrPrng::new();
        prng.counter ^= Block16::from_partial(&seed[..16]);
        Ok(prng)
    }

    /// Seeds the counter and replaces the default key with a caller
    /// supplied one (at least 32 bytes; only the first 32 are used).
    pub fn with_seed_and_key(seed: &[u8], key: &[u8]) -> Result<Self, Error> {
        let mut prng = CtrPrng::with_seed(seed)?;
        prng.aes = AesCore::from_bytes(key)?;
        Ok(prng)
    }

    /// Resets the counter to `default XOR seed` and drains the pool,
    /// so reseeding with the same seed reproduces the same byte
    /// sequence. Only meant for tests and reproducible scenarios.
    pub fn reseed(&mut self, seed: &[u8]) -> Result<(), Error> {
        if seed.len() < 16 {
            return Err(Error::InvalidSeed(seed.len()));
        }
        self.counter = Block16::from_array(DEFAULT_COUNTER) ^ Block16::from_partial(&seed[..16]);
        self.low = 0;
        self.high = 0;
        Ok(())
    }

    /// Returns `size` pseudo-random bytes as a freshly allocated `Vec`.
    pub fn get(&mut self, size: usize) -> Vec<u8> {
        let mut buf = vec![0u8; size];
        self.get_buffer(&mut buf);
        buf
    }

    /// Fills `buf` entirely with pseudo-random bytes drawn from the pool.
    pub fn get_buffer(&mut self, buf: &mut [u8]) {
        let mut size = buf.len();
        let mut offset = 0;
        let mut available = self.high - self.low;

        if available == 0 {
            self.fill_pool();
            available = POOL_SIZE;
        }

        loop {
            let s = size.min(available);
            let low = self.low % POOL_SIZE;

            if s <= POOL_SIZE - low {
                buf[offset..offset + s].copy_from_slice(&self.pool.as_bytes()[low..low + s]);
            } else {
                let first = POOL_SIZE - low;
                buf[offset..offset + first]
                    .copy_from_slice(&self.pool.as_bytes()[low..POOL_SIZE]);
                buf[offset + first..offset + s]
                    .copy_from_slice(&self.pool.as_bytes()[..s - first]);
            }
            self.low += s;

            if size == s {
                return;
            }

            offset += s;
            size -= s;
            self.fill_pool();
            available = POOL_SIZE;
        }
    }

    /// Fills an `N`-byte block with pseudo-random bytes.
    pub fn get_block<const N: usize>(&mut self) -> Block<N> {
        let mut raw = [0u8; N];
        self.get_buffer(&mut raw);
        Block::from_array(raw)
    }

    fn fill_pool(&mut self) {
        while self.high - self.low < POOL_SIZE {
            let mut block = self.counter.post_increment();
            self.aes.encrypt_block(&mut block);
            let offset = self.high % POOL_SIZE;
            self.pool.as_mut_bytes()[offset..offset + 16].copy_from_slice(block.as_bytes());
            self.high += 16;
        }
        self.low %= POOL_SIZE;
        self.high = self.low + POOL_SIZE;
    }
}

impl Default for CtrPrng {
    fn default() -> Self {
        CtrPrng::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_generator_produces_output() {
        let mut prng = CtrPrng::new();
        let a = prng.get(32);
        let b = prng.get(32);
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let seed = b"0123456789abcdef";
        let mut a = CtrPrng::with_seed(seed).unwrap();
        let mut b = CtrPrng::with_seed(seed).unwrap();
        assert_eq!(a.get(100), b.get(100));
    }

    #[test]
    fn reseed_reproduces_sequence() {
        let seed = b"0123456789abcdef";
        let mut prng = CtrPrng::with_seed(seed).unwrap();
        let first = prng.get(50);

        prng.reseed(seed).unwrap();
        let second = prng.get(50);
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = CtrPrng::with_seed(b"0000000000000000").unwrap();
        let mut b = CtrPrng::with_seed(b"1111111111111111").unwrap();
        assert_ne!(a.get(32), b.get(32));
    }

    #[test]
    fn large_request_spans_multiple_pool_refills() {
        let mut prng = CtrPrng::with_seed(b"0123456789abcdef").unwrap();
        let bytes = prng.get(1000);
        assert_eq!(bytes.len(), 1000);
    }

    #[test]
    fn rejects_short_seed() {
        assert!(matches!(
            CtrPrng::with_seed(b"short"),
            Err(Error::InvalidSeed(5))
        ));
    }
}
