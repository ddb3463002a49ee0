//! Seeded pseudo-random sequence.
//!
//! Park–Miller minimal standard generator: `state = state * 16807 mod (2^31 - 1)`.
//! The starting state comes from a shifted-accumulate hash of a key string,
//! so the same key always replays the same sequence, in any process.

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

/// 32-bit shifted-accumulate hash (`h = h * 31 + c`) over UTF-16 code units.
pub fn hash_key(key: &str) -> i32 {
    key.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Deterministic uniform sequence in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Start a sequence from a key string.
    pub fn from_key(key: &str) -> Self {
        let reduced = i64::from(hash_key(key)).rem_euclid(MODULUS as i64) as u64;
        Self {
            state: if reduced == 0 { 1 } else { reduced },
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// Next index in `0..len`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let scaled = (self.next_f64() * len as f64).floor() as usize;
        scaled.min(len.saturating_sub(1))
    }
}
