//! Emission profiles: where particles start and which way they head.
//!
//! A [`Profile`] turns random draws into an `(offset, heading)` pair. The
//! emitter adds the offset to the trigger position and scales the heading by
//! the sampled release speed.
//!
//! # Profile Types
//!
//! | Type | Offset | Heading |
//! |------|--------|---------|
//! | [`Profile::Point`] | zero | random |
//! | [`Profile::Line`] | along `axis` | perpendicular to `axis` |
//! | [`Profile::Ring`] | on the circle edge | radial, or random |
//! | [`Profile::Circle`] | inside the circle | radial, or random |
//! | [`Profile::Spray`] | zero | `direction` ± half of `spread` |
//! | [`Profile::Box`] | on the rectangle edge | random |
//! | [`Profile::BoxFill`] | inside the rectangle | random |
//!
//! # Example
//!
//! ```ignore
//! // Fountain spraying upward in a 0.5 radian fan
//! let profile = Profile::spray(Vec2::NEG_Y, 0.5);
//! let (offset, heading) = profile.sample(&mut rng);
//! ```

use crate::error::{ConfigError, Result};
use crate::random::FastRandom;
use glam::Vec2;
use std::f32::consts::TAU;

/// Shape sampler for initial particle offset and heading.
///
/// Headings are unit vectors. Profiles hold no state; all randomness comes
/// from the [`FastRandom`] passed to [`Profile::sample`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Profile {
    /// Release everything from the trigger position in random directions.
    #[default]
    Point,

    /// Release along a line centred on the trigger position.
    ///
    /// Particles head perpendicular to the line, on either side.
    Line {
        /// Direction of the line. Normalized when sampled.
        axis: Vec2,
        /// Full length of the line.
        length: f32,
    },

    /// Release on the edge of a circle.
    Ring {
        /// Circle radius.
        radius: f32,
        /// If true, head straight outward; otherwise in a random direction.
        radiate: bool,
    },

    /// Release anywhere inside a circle.
    Circle {
        /// Circle radius.
        radius: f32,
        /// If true, head straight outward; otherwise in a random direction.
        radiate: bool,
    },

    /// Release from the trigger position in a fan around `direction`.
    Spray {
        /// Centre of the fan. Normalized when sampled.
        direction: Vec2,
        /// Full fan angle in radians (0 = laser, TAU = every direction).
        spread: f32,
    },

    /// Release on the outline of a rectangle centred on the trigger position.
    Box {
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
    },

    /// Release anywhere inside a rectangle centred on the trigger position.
    BoxFill {
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
    },
}

impl Profile {
    /// Point profile.
    pub const fn point() -> Self {
        Profile::Point
    }

    /// Line profile of the given axis and length.
    pub const fn line(axis: Vec2, length: f32) -> Self {
        Profile::Line { axis, length }
    }

    /// Ring profile.
    pub const fn ring(radius: f32, radiate: bool) -> Self {
        Profile::Ring { radius, radiate }
    }

    /// Filled circle profile.
    pub const fn circle(radius: f32, radiate: bool) -> Self {
        Profile::Circle { radius, radiate }
    }

    /// Spray profile.
    pub const fn spray(direction: Vec2, spread: f32) -> Self {
        Profile::Spray { direction, spread }
    }

    /// Rectangle outline profile.
    pub const fn rect(width: f32, height: f32) -> Self {
        Profile::Box { width, height }
    }

    /// Filled rectangle profile.
    pub const fn rect_fill(width: f32, height: f32) -> Self {
        Profile::BoxFill { width, height }
    }

    /// Variant name, for logging and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Point => "point",
            Profile::Line { .. } => "line",
            Profile::Ring { .. } => "ring",
            Profile::Circle { .. } => "circle",
            Profile::Spray { .. } => "spray",
            Profile::Box { .. } => "box",
            Profile::BoxFill { .. } => "box-fill",
        }
    }

    /// Reject geometry that cannot be sampled.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(ConfigError::InvalidProfile {
                profile: self.name(),
                reason,
            })
        };

        match *self {
            Profile::Point => Ok(()),
            Profile::Line { axis, length } => {
                if !axis.is_finite() || axis.length_squared() == 0.0 {
                    return fail(format!("axis {axis} must be a non-zero finite vector"));
                }
                if !length.is_finite() || length < 0.0 {
                    return fail(format!("length {length} must be finite and non-negative"));
                }
                Ok(())
            }
            Profile::Ring { radius, .. } | Profile::Circle { radius, .. } => {
                if !radius.is_finite() || radius < 0.0 {
                    return fail(format!("radius {radius} must be finite and non-negative"));
                }
                Ok(())
            }
            Profile::Spray { direction, spread } => {
                if !direction.is_finite() || direction.length_squared() == 0.0 {
                    return fail(format!("direction {direction} must be a non-zero finite vector"));
                }
                if !(0.0..=TAU).contains(&spread) {
                    return fail(format!("spread {spread} must lie within [0, TAU]"));
                }
                Ok(())
            }
            Profile::Box { width, height } | Profile::BoxFill { width, height } => {
                if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
                    return fail(format!(
                        "extent {width}x{height} must be finite and non-negative"
                    ));
                }
                Ok(())
            }
        }
    }

    /// Sample an `(offset, heading)` pair.
    pub fn sample(&self, rng: &mut FastRandom) -> (Vec2, Vec2) {
        match *self {
            Profile::Point => (Vec2::ZERO, rng.next_unit_vector()),

            Profile::Line { axis, length } => {
                let axis = axis.normalize_or_zero();
                let offset = axis * (length * (rng.next_single() - 0.5));
                let side = if rng.next_single() < 0.5 { 1.0 } else { -1.0 };
                (offset, axis.perp() * side)
            }

            Profile::Ring { radius, radiate } => {
                let outward = rng.next_unit_vector();
                let heading = if radiate { outward } else { rng.next_unit_vector() };
                (outward * radius, heading)
            }

            Profile::Circle { radius, radiate } => {
                let outward = rng.next_unit_vector();
                let distance = radius * rng.next_single();
                let heading = if radiate { outward } else { rng.next_unit_vector() };
                (outward * distance, heading)
            }

            Profile::Spray { direction, spread } => {
                let base = direction.y.atan2(direction.x);
                let angle = base + spread * (rng.next_single() - 0.5);
                (Vec2::ZERO, Vec2::from_angle(angle))
            }

            Profile::Box { width, height } => {
                let offset = Self::sample_outline(rng, width, height);
                (offset, rng.next_unit_vector())
            }

            Profile::BoxFill { width, height } => {
                let offset = Vec2::new(
                    width * (rng.next_single() - 0.5),
                    height * (rng.next_single() - 0.5),
                );
                (offset, rng.next_unit_vector())
            }
        }
    }

    /// Uniform point on a rectangle's perimeter, centred on the origin.
    fn sample_outline(rng: &mut FastRandom, width: f32, height: f32) -> Vec2 {
        let perimeter = 2.0 * (width + height);
        if perimeter == 0.0 {
            return Vec2::ZERO;
        }

        let half = Vec2::new(width, height) * 0.5;
        let mut d = rng.next_single() * perimeter;

        if d < width {
            return Vec2::new(d - half.x, -half.y);
        }
        d -= width;
        if d < height {
            return Vec2::new(half.x, d - half.y);
        }
        d -= height;
        if d < width {
            return Vec2::new(half.x - d, half.y);
        }
        d -= width;
        Vec2::new(-half.x, half.y - d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_point_has_zero_offset() {
        let mut rng = FastRandom::seeded(1);
        for _ in 0..50 {
            let (offset, heading) = Profile::point().sample(&mut rng);
            assert_eq!(offset, Vec2::ZERO);
            assert!((heading.length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_line_heading_is_perpendicular() {
        let mut rng = FastRandom::seeded(2);
        let profile = Profile::line(Vec2::new(2.0, 0.0), 10.0);
        for _ in 0..50 {
            let (offset, heading) = profile.sample(&mut rng);
            assert!(offset.y.abs() < EPS);
            assert!(offset.x.abs() <= 5.0 + EPS);
            assert!(heading.x.abs() < EPS);
            assert!((heading.y.abs() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_ring_offsets_sit_on_radius() {
        let mut rng = FastRandom::seeded(3);
        let profile = Profile::ring(4.0, true);
        for _ in 0..50 {
            let (offset, heading) = profile.sample(&mut rng);
            assert!((offset.length() - 4.0).abs() < EPS);
            assert!((offset.normalize() - heading).length() < EPS);
        }
    }

    #[test]
    fn test_circle_offsets_within_radius() {
        let mut rng = FastRandom::seeded(4);
        let profile = Profile::circle(3.0, false);
        for _ in 0..50 {
            let (offset, _) = profile.sample(&mut rng);
            assert!(offset.length() <= 3.0 + EPS);
        }
    }

    #[test]
    fn test_spray_stays_within_fan() {
        let mut rng = FastRandom::seeded(5);
        let profile = Profile::spray(Vec2::Y, 0.5);
        for _ in 0..100 {
            let (offset, heading) = profile.sample(&mut rng);
            assert_eq!(offset, Vec2::ZERO);
            assert!(heading.dot(Vec2::Y).clamp(-1.0, 1.0).acos() <= 0.25 + 1e-3);
        }
    }

    #[test]
    fn test_box_offsets_on_outline() {
        let mut rng = FastRandom::seeded(6);
        let profile = Profile::rect(4.0, 2.0);
        for _ in 0..100 {
            let (offset, _) = profile.sample(&mut rng);
            let on_vertical = (offset.x.abs() - 2.0).abs() < EPS && offset.y.abs() <= 1.0 + EPS;
            let on_horizontal = (offset.y.abs() - 1.0).abs() < EPS && offset.x.abs() <= 2.0 + EPS;
            assert!(on_vertical || on_horizontal, "{offset} is not on the outline");
        }
    }

    #[test]
    fn test_box_fill_offsets_inside() {
        let mut rng = FastRandom::seeded(7);
        let profile = Profile::rect_fill(4.0, 2.0);
        for _ in 0..100 {
            let (offset, _) = profile.sample(&mut rng);
            assert!(offset.x.abs() <= 2.0 && offset.y.abs() <= 1.0);
        }
    }

    #[test]
    fn test_validation() {
        assert!(Profile::point().validate().is_ok());
        assert!(Profile::ring(-1.0, true).validate().is_err());
        assert!(Profile::line(Vec2::ZERO, 1.0).validate().is_err());
        assert!(Profile::spray(Vec2::X, 7.0).validate().is_err());
        assert!(Profile::rect_fill(f32::INFINITY, 1.0).validate().is_err());
        assert!(Profile::spray(Vec2::X, TAU).validate().is_ok());
    }
}
