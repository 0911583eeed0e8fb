//! Deterministic 1-D value noise
//!
//! The only source of "randomness" in track generation. Every value is a pure
//! function of (seed, coordinate), so the same seed always yields the same
//! track regardless of platform state or call order.

/// Golden-ratio constant used to decorrelate derived seeds
pub const GOLDEN_RATIO_U32: u32 = 0x9E37_79B9;

/// Multiplier mixing the lattice index into the seed
const LATTICE_PRIME: u32 = 0x27D4_EB2D;

/// Avalanche hash of a lattice coordinate
#[inline]
pub fn hash_lattice(seed: u32, x: i32) -> u32 {
    let mut h = seed ^ (x as u32).wrapping_mul(LATTICE_PRIME);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Hash mapped to [-1, 1]
#[inline]
pub fn lattice_value(seed: u32, x: i32) -> f64 {
    hash_lattice(seed, x) as f64 / u32::MAX as f64 * 2.0 - 1.0
}

/// Cubic Hermite smoothstep on [0, 1]
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Value noise at `t` (lattice spacing 1), range [-1, 1]
pub fn value_noise(seed: u32, t: f64) -> f64 {
    let cell = t.floor();
    let frac = t - cell;
    let i = cell as i32;
    let a = lattice_value(seed, i);
    let b = lattice_value(seed, i.wrapping_add(1));
    a + (b - a) * smoothstep(frac)
}

/// Per-level generation seed (levels are 1-based)
#[inline]
pub fn level_seed(seed: u32, level: u32) -> u32 {
    seed ^ level.saturating_sub(1).wrapping_mul(LATTICE_PRIME)
}

/// Seed for a generation retry; attempt 0 keeps the level seed
#[inline]
pub fn attempt_seed(seed: u32, attempt: u32) -> u32 {
    seed ^ attempt.wrapping_mul(GOLDEN_RATIO_U32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_noise_matches_lattice_at_integers() {
        for i in -5..5 {
            assert_eq!(value_noise(7, i as f64), lattice_value(7, i));
        }
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a: Vec<f64> = (0..100).map(|i| value_noise(42, i as f64 * 0.37)).collect();
        let b: Vec<f64> = (0..100).map(|i| value_noise(42, i as f64 * 0.37)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_differ() {
        let differs = (0..32).any(|i| lattice_value(1, i) != lattice_value(2, i));
        assert!(differs);
    }

    #[test]
    fn test_level_and_attempt_seed() {
        assert_eq!(level_seed(42, 1), 42);
        assert_eq!(level_seed(42, 0), 42);
        assert_ne!(level_seed(42, 2), 42);
        assert_eq!(attempt_seed(42, 0), 42);
        assert_ne!(attempt_seed(42, 1), attempt_seed(42, 2));
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_noise_in_range(seed in any::<u32>(), t in -1.0e4f64..1.0e4) {
            let v = value_noise(seed, t);
            prop_assert!((-1.0..=1.0).contains(&v));
        }
    }
}
