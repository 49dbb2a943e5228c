//! Fast random sampling for particle release.
//!
//! Every released particle draws several values (speed, colour, opacity,
//! scale, rotation, mass, plus whatever its profile needs), so sampling has
//! to be cheap. [`FastRandom`] wraps a [`SmallRng`]: non-cryptographic with
//! a few words of state.
//!
//! ```ignore
//! let mut rng = FastRandom::seeded(7);
//! let speed = rng.next_single_in(RangeF::new(0.0, 100.0));
//! let quantity = rng.next_integer_in(RangeI::new(5, 10)); // 5..=10
//! ```

use crate::colour::{Colour, ColourRange};
use crate::error::{ConfigError, Result};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};
use std::ops::RangeInclusive;

/// An inclusive range of `f32` values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeF {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl RangeF {
    /// Create a range. Not validated until the owning emitter is built.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Check that the range is finite and not inverted.
    pub fn validate(&self, parameter: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                parameter,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl From<f32> for RangeF {
    fn from(value: f32) -> Self {
        Self::fixed(value)
    }
}

impl From<RangeInclusive<f32>> for RangeF {
    fn from(range: RangeInclusive<f32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

/// An inclusive range of release counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeI {
    /// Lower bound.
    pub min: u32,
    /// Upper bound (inclusive).
    pub max: u32,
}

impl RangeI {
    /// Create a range. Not validated until the owning emitter is built.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`.
    pub const fn fixed(value: u32) -> Self {
        Self { min: value, max: value }
    }

    /// Check that the range is not inverted.
    pub fn validate(&self, parameter: &'static str) -> Result<()> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                parameter,
                min: self.min as f32,
                max: self.max as f32,
            });
        }
        Ok(())
    }
}

impl Default for RangeI {
    fn default() -> Self {
        Self::fixed(1)
    }
}

impl From<u32> for RangeI {
    fn from(value: u32) -> Self {
        Self::fixed(value)
    }
}

impl From<RangeInclusive<u32>> for RangeI {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

/// Low-overhead random source used during particle release.
///
/// Unseeded instances draw their seed from the OS, so runs differ. Use
/// [`FastRandom::seeded`] when a reproducible sequence is needed.
#[derive(Clone, Debug)]
pub struct FastRandom {
    rng: SmallRng,
}

impl FastRandom {
    /// Create a generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Re-seed in place.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Uniform `f32` in `[0, 1)`.
    #[inline]
    pub fn next_single(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform `f32` within `range`. A fixed range returns its value exactly.
    #[inline]
    pub fn next_single_in(&mut self, range: RangeF) -> f32 {
        if range.min == range.max {
            return range.min;
        }
        range.min + (range.max - range.min) * self.next_single()
    }

    /// Uniform integer in `[0, max]`, both ends inclusive.
    #[inline]
    pub fn next_integer(&mut self, max: u32) -> u32 {
        self.rng.gen_range(0..=max)
    }

    /// Uniform integer within `range`, both ends inclusive.
    #[inline]
    pub fn next_integer_in(&mut self, range: RangeI) -> u32 {
        if range.min >= range.max {
            return range.min;
        }
        self.rng.gen_range(range.min..=range.max)
    }

    /// Uniform angle in `[-PI, PI)`.
    #[inline]
    pub fn next_angle(&mut self) -> f32 {
        self.next_single() * TAU - PI
    }

    /// Unit vector pointing in a uniformly random direction.
    #[inline]
    pub fn next_unit_vector(&mut self) -> Vec2 {
        Vec2::from_angle(self.next_angle())
    }

    /// Colour sampled component-wise within `range`.
    #[inline]
    pub fn next_colour(&mut self, range: &ColourRange) -> Colour {
        if range.min == range.max {
            return range.min;
        }
        let t = Vec3::new(self.next_single(), self.next_single(), self.next_single());
        range.lerp(t)
    }
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = FastRandom::seeded(42);
        let mut b = FastRandom::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.next_single(), b.next_single());
        }
    }

    #[test]
    fn test_single_in_range() {
        let mut rng = FastRandom::seeded(1);
        let range = RangeF::new(-3.0, 5.0);
        for _ in 0..1000 {
            let v = rng.next_single_in(range);
            assert!((-3.0..=5.0).contains(&v));
        }
        assert_eq!(rng.next_single_in(RangeF::fixed(2.5)), 2.5);
    }

    #[test]
    fn test_integer_upper_bound_is_inclusive() {
        let mut rng = FastRandom::seeded(3);
        let mut seen_max = false;
        for _ in 0..1000 {
            let v = rng.next_integer(3);
            assert!(v <= 3);
            seen_max |= v == 3;
        }
        assert!(seen_max);
    }

    #[test]
    fn test_fixed_integer_range() {
        let mut rng = FastRandom::seeded(9);
        for _ in 0..10 {
            assert_eq!(rng.next_integer_in(RangeI::fixed(10)), 10);
        }
    }

    #[test]
    fn test_integer_range_bounds() {
        let mut rng = FastRandom::seeded(11);
        for _ in 0..1000 {
            let v = rng.next_integer_in(RangeI::new(5, 8));
            assert!((5..=8).contains(&v));
        }
    }

    #[test]
    fn test_unit_vector_is_normalized() {
        let mut rng = FastRandom::seeded(5);
        for _ in 0..100 {
            assert!((rng.next_unit_vector().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_colour_within_range() {
        let mut rng = FastRandom::seeded(8);
        let range = ColourRange::new(Colour::new(210.0, 0.5, 0.6), Colour::new(230.0, 0.7, 0.8));
        for _ in 0..100 {
            let c = rng.next_colour(&range);
            assert!((210.0..=230.0).contains(&c.h));
            assert!((0.5..=0.7).contains(&c.s));
            assert!((0.6..=0.8).contains(&c.l));
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(RangeF::new(1.0, 0.0).validate("speed").is_err());
        assert!(RangeF::new(f32::NAN, 0.0).validate("speed").is_err());
        assert!(RangeI::new(4, 2).validate("quantity").is_err());
        assert!(RangeF::from(0.0..=1.0).validate("opacity").is_ok());
    }
}
