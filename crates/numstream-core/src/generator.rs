//! The 32-bit Mersenne Twister (MT19937).
//!
//! Clients recompute the server's checksum from the numbers they receive, so
//! the only requirement is that the output stream matches the reference
//! MT19937 bit-for-bit for a given seed. Seeding uses the standard
//! `init_genrand` recurrence over the low 32 bits of the seed.

use std::fmt;

use rand::RngCore;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;
const INIT_MULTIPLIER: u32 = 1_812_433_253;

/// Seed used by the reference implementation when none is given.
pub const DEFAULT_SEED: u64 = 5489;

/// MT19937 generator state.
///
/// `Clone` copies the whole state vector, so a cloned generator continues
/// independently from the same position.
#[derive(Clone, PartialEq, Eq)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    /// Create a generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        let mut mt = Self {
            state: [0u32; N],
            index: N,
        };
        mt.seed(seed);
        mt
    }

    /// Reset the generator to the state derived from `seed`.
    ///
    /// Only the low 32 bits of `seed` are used.
    pub fn seed(&mut self, seed: u64) {
        self.state[0] = seed as u32;
        for i in 1..N {
            let prev = self.state[i - 1];
            self.state[i] = INIT_MULTIPLIER
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.index = N;
    }

    /// Advance the generator and return the next output.
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        // Tempering
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    /// Regenerate the full state vector.
    fn twist(&mut self) {
        for i in 0..N {
            let y = (self.state[i] & UPPER_MASK) | (self.state[(i + 1) % N] & LOWER_MASK);
            let mut next = self.state[(i + M) % N] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= MATRIX_A;
            }
            self.state[i] = next;
        }
        self.index = 0;
    }
}

impl Default for Mt19937 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mt19937").field("index", &self.index).finish_non_exhaustive()
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        Mt19937::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(Mt19937::next_u32(self));
        let high = u64::from(Mt19937::next_u32(self));
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        // Little-endian words; a short tail takes the low bytes of one more.
        for chunk in dest.chunks_mut(4) {
            let word = Mt19937::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
