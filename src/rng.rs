//! Bounded random draws for particle creation.
//!
//! Every draw is clamped into its half-open range, so callers never see an
//! out-of-range value whatever the generator does.

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform draw in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        let v = lo + self.next_f64() * (hi - lo);
        // guard the upper edge against float rounding
        if v >= hi { lo } else { v }
    }

    /// Uniform index in `0..len`; 0 when `len == 0`.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// xorshift64* generator. Small, fast and plenty for visual jitter.
#[derive(Clone, Debug)]
pub struct Xorshift {
    state: u64,
}

impl Xorshift {
    pub fn seeded(seed: u64) -> Self {
        // zero is a fixed point of xorshift
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Seed from browser / OS entropy when available.
    pub fn from_entropy() -> Self {
        Self::seeded(entropy_seed())
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl RandomSource for Xorshift {
    fn next_f64(&mut self) -> f64 {
        // top 53 bits -> [0, 1)
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(feature = "rng")]
fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("entropy unavailable ({err}); falling back to clock seed");
            clock_seed()
        }
    }
}

#[cfg(not(feature = "rng"))]
fn entropy_seed() -> u64 {
    clock_seed()
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    let now = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    // LCG scramble of the timestamp (not crypto secure)
    now.to_bits()
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(dead_code)]
fn clock_seed() -> u64 {
    0x5EED_CA4D
}
