// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// This is a hand-rolled implementation with zero external dependencies, chosen
// for portability and to guarantee identical output across all platforms.
//
// This crate is the single source of randomness for the entire Tidevetch
// project: `tidevetch_sim` owns exactly one `SimRng` and every stochastic
// decision in a run (Bernoulli survival draws, dispersal distances, float-time
// sampling, junction picks) flows through it. By sharing one PRNG we avoid
// depending on external RNG crates (like `rand`) and guarantee deterministic,
// reproducible runs given the same seed.
//
// **Critical constraint: determinism.** The core generator must produce
// identical output given the same prior state, regardless of platform,
// compiler version, or optimization level — it is integer-only. The
// distribution samplers layered on top (`normal`, `gamma`) use floating-point
// math and consume a variable number of raw draws, but are pure functions of
// the generator state.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG — the project's sole source of randomness.
///
/// The simulation state owns exactly one `SimRng`, seeded from the run seed.
/// Auxiliary consumers (the demo landscape builder, benchmarks) create their
/// own instances with fixed seeds so they never perturb a run's stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimRng {
    s: [u64; 4],
}

impl SimRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `SimRng` instances created with the same seed will produce
    /// identical output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa of an f64.
    /// 53 bits gives full f64 precision (IEEE 754 double has a 52-bit
    /// mantissa + 1 implicit bit).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low < high, "range_f64: low must be less than high");
        low + self.next_f64() * (high - low)
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // Rejection sampling to avoid modulo bias.
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Delegates to `range_u64` for the actual sampling.
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Return `true` with probability `p`, `false` otherwise.
    ///
    /// `p` should be in [0.0, 1.0]. Values outside this range are clamped:
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Standard normal deviate via the Marsaglia polar method.
    ///
    /// The second deviate of each accepted pair is discarded, trading a few
    /// raw draws for a stateless sampler.
    pub fn normal(&mut self) -> f64 {
        loop {
            let u = 2.0 * self.next_f64() - 1.0;
            let v = 2.0 * self.next_f64() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }

    /// Gamma deviate with the given shape and rate, via Marsaglia & Tsang's
    /// squeeze method.
    ///
    /// For `shape < 1` the draw is boosted from `gamma(shape + 1)` by
    /// `u^(1/shape)`. The mean of the distribution is `shape / rate`.
    /// Panics if either parameter is non-positive.
    pub fn gamma(&mut self, shape: f64, rate: f64) -> f64 {
        assert!(
            shape > 0.0 && rate > 0.0,
            "gamma: shape and rate must be positive"
        );
        if shape < 1.0 {
            let boost = self.next_f64().powf(1.0 / shape);
            return self.gamma(shape + 1.0, rate) * boost;
        }
        let d = shape - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        loop {
            let x = self.normal();
            let v = (1.0 + c * x).powi(3);
            if v <= 0.0 {
                continue;
            }
            let u = self.next_f64();
            if u < 1.0 - 0.0331 * x.powi(4) {
                return d * v / rate;
            }
            if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
                return d * v / rate;
            }
        }
    }
}

/// SplitMix64 — used only for seeding xoshiro256++ from a single `u64`.
///
/// This is the standard recommendation from the xoshiro authors for
/// expanding a small seed into a larger state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(43);
        // Extremely unlikely to collide on the first value.
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = SimRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_u64_within_bounds() {
        let mut rng = SimRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 20);
            assert!((10..20).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn range_f64_within_bounds() {
        let mut rng = SimRng::new(777);
        for _ in 0..10_000 {
            let v = rng.range_f64(1.5, 3.5);
            assert!(v >= 1.5 && v < 3.5, "range_f64 out of range: {v}");
        }
    }

    #[test]
    fn range_usize_within_bounds() {
        let mut rng = SimRng::new(555);
        for _ in 0..10_000 {
            let v = rng.range_usize(5, 15);
            assert!((5..15).contains(&v), "range_usize out of range: {v}");
        }
    }

    #[test]
    fn random_bool_distribution() {
        let mut rng = SimRng::new(42);
        let mut true_count = 0;
        let n = 10_000;
        for _ in 0..n {
            if rng.random_bool(0.5) {
                true_count += 1;
            }
        }
        // Should be roughly 50% ± 5%
        let pct = true_count as f64 / n as f64;
        assert!(
            (0.45..0.55).contains(&pct),
            "random_bool(0.5) should be ~50%, got {:.1}%",
            pct * 100.0
        );
    }

    #[test]
    fn random_bool_extremes() {
        let mut rng = SimRng::new(42);
        // p=0.0 should always return false
        for _ in 0..100 {
            assert!(!rng.random_bool(0.0));
        }
        // p=1.0 should always return true
        for _ in 0..100 {
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn normal_moments() {
        let mut rng = SimRng::new(42);
        let n = 10_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "normal mean should be ~0, got {mean}");
        assert!(
            (var - 1.0).abs() < 0.08,
            "normal variance should be ~1, got {var}"
        );
    }

    #[test]
    fn normal_determinism() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        for _ in 0..1000 {
            assert_eq!(a.normal(), b.normal());
        }
    }

    #[test]
    fn gamma_moments() {
        // Shape/rate from a mean-0.3, sd-0.25 parameterization:
        // shape = mean^2/var = 1.44, rate = mean/var = 4.8.
        let mut rng = SimRng::new(12345);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.gamma(1.44, 4.8)).collect();
        assert!(draws.iter().all(|&d| d > 0.0), "gamma draws must be positive");
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n as f64;
        assert!(
            (mean - 0.3).abs() < 0.02,
            "gamma mean should be ~0.3, got {mean}"
        );
        assert!(
            (var - 0.0625).abs() < 0.01,
            "gamma variance should be ~0.0625, got {var}"
        );
    }

    #[test]
    fn gamma_shape_below_one() {
        let mut rng = SimRng::new(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.gamma(0.5, 2.0)).collect();
        assert!(draws.iter().all(|&d| d >= 0.0));
        let mean = draws.iter().sum::<f64>() / n as f64;
        // Mean = shape/rate = 0.25.
        assert!(
            (mean - 0.25).abs() < 0.02,
            "gamma(0.5, 2.0) mean should be ~0.25, got {mean}"
        );
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = SimRng::new(42);
        // Advance state
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SimRng = serde_json::from_str(&json).unwrap();
        // Continued sequences should match.
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }

    #[test]
    fn known_sequence_stability() {
        let mut rng = SimRng::new(0);
        // Just verify the sequence is stable across compiles. If this
        // test ever breaks, determinism has been violated.
        let vals: Vec<u64> = (0..5).map(|_| rng.next_u64()).collect();
        let mut rng2 = SimRng::new(0);
        let vals2: Vec<u64> = (0..5).map(|_| rng2.next_u64()).collect();
        assert_eq!(vals, vals2);
    }
}
