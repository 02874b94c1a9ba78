//! Deterministic 32-bit PRNG for mutation decisions.
//!
//! A single xorshift32 generator, seeded once per session. The only
//! contract that matters to the rest of the crate: given a seed, the
//! sequence of [`Prng::next_u32`] values is fully reproducible, with
//! period `2^32 - 1` and reasonable uniformity over the small moduli
//! used for weighted choices (see [`Prng::next_below`]).

/// A seeded xorshift32 generator.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u32,
}

impl Prng {
    /// Construct a generator from an explicit seed. A seed of 0 is
    /// remapped to a fixed non-zero constant, since xorshift is stuck
    /// at 0 forever otherwise.
    pub fn new(seed: u32) -> Self {
        Prng {
            state: if seed == 0 { 0x9E3779B9 } else { seed },
        }
    }

    /// Construct a generator seeded from wall-clock time, for use at
    /// process init where no explicit seed is supplied.
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(0x1234_5678);
        Prng::new(nanos)
    }

    /// Advance the generator and return the next 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `0..bound`. Returns 0 when `bound == 0`.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.next_u32() % bound
        }
    }

    /// `true` with probability `percent/100` (values above 100 saturate
    /// to "always true").
    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.next_below(100) < percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_given_seed() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        let seq_a: Vec<u32> = (0..16).map(|_| a.next_u32()).collect();
        let seq_b: Vec<u32> = (0..16).map(|_| b.next_u32()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Prng::new(1);
        let mut b = Prng::new(2);
        assert_ne!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn next_below_stays_in_range() {
        let mut p = Prng::new(7);
        for _ in 0..1000 {
            assert!(p.next_below(32) < 32);
        }
    }

    #[test]
    fn zero_seed_does_not_stick_at_zero() {
        let mut p = Prng::new(0);
        assert_ne!(p.next_u32(), 0);
    }

    #[test]
    fn uniformity_sanity_over_small_modulus() {
        let mut p = Prng::new(123);
        let mut buckets = [0u32; 4];
        for _ in 0..4000 {
            buckets[p.next_below(4) as usize] += 1;
        }
        for count in buckets {
            assert!((800..1200).contains(&count), "bucket count {count} looks skewed");
        }
    }
}
