//! Per-particle modifiers.
//!
//! Modifiers change live particles every update, after the emitter has aged
//! and moved them. They run in the order they were added to the emitter.
//!
//! # Modifier Categories
//!
//! - **Forces**: LinearGravity, Drag, Vortex
//! - **Over-life interpolation**: ScaleInterpolator, OpacityInterpolator,
//!   ColourInterpolator, HueInterpolator, OpacityFastFade
//! - **Motion**: Rotation
//! - **Constraints**: Container
//! - **Custom**: Custom (any `Fn(&mut Particle, f32)`)
//!
//! # Throttling
//!
//! Each [`Modifier`] has its own frequency. It collects elapsed time and
//! only fires once a full `1 / frequency` period has built up, then applies
//! itself with the whole collected time as its step. A smoke cloud can
//! interpolate scale at 60 Hz while its drag runs at 10 Hz.
//!
//! # Independence
//!
//! Every modifier reads and writes exactly one particle at a time. The
//! parallel execution strategy relies on this: chunks of the live range are
//! handed to different workers with no coordination.
//!
//! ```ignore
//! let modifiers = vec![
//!     Modifier::new(ModifierKind::LinearGravity { direction: Vec2::Y, strength: 30.0 })
//!         .with_frequency(15.0),
//!     Modifier::new(ModifierKind::OpacityFastFade).with_frequency(10.0),
//! ];
//! ```

use crate::colour::Colour;
use crate::error::{ConfigError, Result};
use crate::particle::Particle;
use glam::{Vec2, Vec3};
use std::fmt;
use std::sync::Arc;

/// Frequency used when none is configured, in Hz.
pub const DEFAULT_MODIFIER_FREQUENCY: f32 = 60.0;

/// User-supplied per-particle transform.
///
/// Receives one particle and the modifier step in seconds. It must not
/// reach other particles; under the parallel strategy it runs concurrently
/// on disjoint chunks.
#[derive(Clone)]
pub struct CustomModifier(Arc<dyn Fn(&mut Particle, f32) + Send + Sync>);

impl CustomModifier {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&mut Particle, f32) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    fn call(&self, particle: &mut Particle, step: f32) {
        (self.0)(particle, step)
    }
}

impl fmt::Debug for CustomModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomModifier(..)")
    }
}

/// What a modifier does to each particle.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKind {
    /// Constant acceleration along `direction`.
    ///
    /// ```ignore
    /// ModifierKind::LinearGravity { direction: Vec2::Y, strength: 30.0 }
    /// ```
    LinearGravity {
        /// Direction of pull. Normalized when applied.
        direction: Vec2,
        /// Acceleration in units per second squared.
        strength: f32,
    },

    /// Quadratic air resistance.
    ///
    /// Deceleration is `0.5 * density * drag_coefficient * speed² / mass`.
    /// Zero density or coefficient leaves velocity untouched.
    Drag {
        /// Shape-dependent drag coefficient (a sphere is about 0.47).
        drag_coefficient: f32,
        /// Density of the surrounding medium.
        density: f32,
    },

    /// Spin at a constant rate.
    Rotation {
        /// Radians per second.
        rate: f32,
    },

    /// Blend scale from `start` to `end` over the particle's life.
    ScaleInterpolator {
        /// Scale at age 0.
        start: f32,
        /// Scale at age 1.
        end: f32,
    },

    /// Blend opacity from `start` to `end` over the particle's life.
    OpacityInterpolator {
        /// Opacity at age 0.
        start: f32,
        /// Opacity at age 1.
        end: f32,
    },

    /// Blend all three colour channels over the particle's life.
    ColourInterpolator {
        /// Colour at age 0.
        start: Colour,
        /// Colour at age 1.
        end: Colour,
    },

    /// Blend only the hue channel over the particle's life.
    HueInterpolator {
        /// Hue at age 0, in degrees.
        start: f32,
        /// Hue at age 1, in degrees.
        end: f32,
    },

    /// Opacity falls linearly from 1 to 0 with age.
    OpacityFastFade,

    /// Keep particles inside an axis-aligned rectangle, bouncing off its walls.
    ///
    /// The particle's half scale is treated as its radius.
    Container {
        /// Centre of the rectangle.
        position: Vec2,
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
        /// Fraction of speed kept after a bounce (1 = perfectly elastic).
        restitution: f32,
    },

    /// Pull particles toward a point with inverse-square strength.
    Vortex {
        /// Centre of attraction.
        position: Vec2,
        /// Attractor strength (gravitational constant folded in).
        mass: f32,
        /// Speed cap applied after the pull.
        max_speed: f32,
    },

    /// Arbitrary per-particle transform.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomModifier),
}

impl ModifierKind {
    /// Wrap a closure as a custom modifier kind.
    pub fn custom(f: impl Fn(&mut Particle, f32) + Send + Sync + 'static) -> Self {
        ModifierKind::Custom(CustomModifier::new(f))
    }

    /// Variant name, for logging and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ModifierKind::LinearGravity { .. } => "linear-gravity",
            ModifierKind::Drag { .. } => "drag",
            ModifierKind::Rotation { .. } => "rotation",
            ModifierKind::ScaleInterpolator { .. } => "scale-interpolator",
            ModifierKind::OpacityInterpolator { .. } => "opacity-interpolator",
            ModifierKind::ColourInterpolator { .. } => "colour-interpolator",
            ModifierKind::HueInterpolator { .. } => "hue-interpolator",
            ModifierKind::OpacityFastFade => "opacity-fast-fade",
            ModifierKind::Container { .. } => "container",
            ModifierKind::Vortex { .. } => "vortex",
            ModifierKind::Custom(_) => "custom",
        }
    }

    /// Reject parameters that would poison particle state.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(ConfigError::InvalidModifier {
                modifier: self.name(),
                reason: reason.to_string(),
            })
        };

        match self {
            ModifierKind::LinearGravity { direction, strength } => {
                if !direction.is_finite() || !strength.is_finite() {
                    return fail("direction and strength must be finite");
                }
            }
            ModifierKind::Drag { drag_coefficient, density } => {
                if !(drag_coefficient.is_finite() && density.is_finite()) {
                    return fail("coefficient and density must be finite");
                }
                if *drag_coefficient < 0.0 || *density < 0.0 {
                    return fail("coefficient and density must be non-negative");
                }
            }
            ModifierKind::Rotation { rate } => {
                if !rate.is_finite() {
                    return fail("rate must be finite");
                }
            }
            ModifierKind::ScaleInterpolator { start, end }
            | ModifierKind::OpacityInterpolator { start, end }
            | ModifierKind::HueInterpolator { start, end } => {
                if !(start.is_finite() && end.is_finite()) {
                    return fail("endpoints must be finite");
                }
            }
            ModifierKind::ColourInterpolator { start, end } => {
                if !(start.is_finite() && end.is_finite()) {
                    return fail("endpoints must be finite");
                }
            }
            ModifierKind::OpacityFastFade | ModifierKind::Custom(_) => {}
            ModifierKind::Container {
                position,
                width,
                height,
                restitution,
            } => {
                if !(position.is_finite() && width.is_finite() && height.is_finite()) {
                    return fail("position and extent must be finite");
                }
                if *width < 0.0 || *height < 0.0 {
                    return fail("extent must be non-negative");
                }
                if !restitution.is_finite() || *restitution < 0.0 {
                    return fail("restitution must be finite and non-negative");
                }
            }
            ModifierKind::Vortex {
                position,
                mass,
                max_speed,
            } => {
                if !(position.is_finite() && mass.is_finite() && max_speed.is_finite()) {
                    return fail("position, mass and max speed must be finite");
                }
                if *max_speed < 0.0 {
                    return fail("max speed must be non-negative");
                }
            }
        }
        Ok(())
    }

    /// Apply this modifier to every particle in `particles` with the given step.
    pub fn apply(&self, step: f32, particles: &mut [Particle]) {
        match self {
            ModifierKind::LinearGravity { direction, strength } => {
                let delta = direction.normalize_or_zero() * (*strength * step);
                for p in particles {
                    p.velocity += delta;
                }
            }

            ModifierKind::Drag { drag_coefficient, density } => {
                let k = 0.5 * drag_coefficient * density;
                if k == 0.0 {
                    return;
                }
                for p in particles {
                    let mass = if p.mass > 0.0 { p.mass } else { 1.0 };
                    let loss = (k * p.velocity.length() * step / mass).min(1.0);
                    p.velocity *= 1.0 - loss;
                }
            }

            ModifierKind::Rotation { rate } => {
                let delta = rate * step;
                for p in particles {
                    p.rotation += delta;
                }
            }

            ModifierKind::ScaleInterpolator { start, end } => {
                let span = end - start;
                for p in particles {
                    p.scale = start + span * p.age;
                }
            }

            ModifierKind::OpacityInterpolator { start, end } => {
                let span = end - start;
                for p in particles {
                    p.opacity = start + span * p.age;
                }
            }

            ModifierKind::ColourInterpolator { start, end } => {
                let start = Vec3::from(*start);
                let span = Vec3::from(*end) - start;
                for p in particles {
                    p.colour = start + span * p.age;
                }
            }

            ModifierKind::HueInterpolator { start, end } => {
                let span = end - start;
                for p in particles {
                    p.colour.x = start + span * p.age;
                }
            }

            ModifierKind::OpacityFastFade => {
                for p in particles {
                    p.opacity = 1.0 - p.age;
                }
            }

            ModifierKind::Container {
                position,
                width,
                height,
                restitution,
            } => {
                let half = Vec2::new(*width, *height) * 0.5;
                let min = *position - half;
                let max = *position + half;
                let max_radius = half.min_element();

                for p in particles {
                    let radius = (p.scale * 0.5).clamp(0.0, max_radius);
                    let lo = min + radius;
                    let hi = max - radius;

                    if p.position.x < lo.x {
                        p.position.x = 2.0 * lo.x - p.position.x;
                        if p.velocity.x < 0.0 {
                            p.velocity.x = -p.velocity.x * restitution;
                        }
                    } else if p.position.x > hi.x {
                        p.position.x = 2.0 * hi.x - p.position.x;
                        if p.velocity.x > 0.0 {
                            p.velocity.x = -p.velocity.x * restitution;
                        }
                    }

                    if p.position.y < lo.y {
                        p.position.y = 2.0 * lo.y - p.position.y;
                        if p.velocity.y < 0.0 {
                            p.velocity.y = -p.velocity.y * restitution;
                        }
                    } else if p.position.y > hi.y {
                        p.position.y = 2.0 * hi.y - p.position.y;
                        if p.velocity.y > 0.0 {
                            p.velocity.y = -p.velocity.y * restitution;
                        }
                    }

                    // A reflection can overshoot the opposite wall when the
                    // particle was far outside.
                    p.position = p.position.clamp(lo, hi);
                }
            }

            ModifierKind::Vortex {
                position,
                mass,
                max_speed,
            } => {
                for p in particles {
                    let offset = *position - p.position;
                    let distance_sq = offset.length_squared().max(1.0);
                    let pull = mass / distance_sq * step;
                    p.velocity += offset.normalize_or_zero() * pull;
                    p.velocity = p.velocity.clamp_length_max(*max_speed);
                }
            }

            ModifierKind::Custom(f) => {
                for p in particles {
                    f.call(p, step);
                }
            }
        }
    }
}

/// A modifier with its own update frequency.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    /// What the modifier does.
    pub kind: ModifierKind,
    frequency: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    accumulated: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pending: Option<f32>,
}

impl Modifier {
    /// Create a modifier running at [`DEFAULT_MODIFIER_FREQUENCY`].
    pub fn new(kind: ModifierKind) -> Self {
        Self {
            kind,
            frequency: DEFAULT_MODIFIER_FREQUENCY,
            accumulated: 0.0,
            pending: None,
        }
    }

    /// Set how many times per second the modifier fires.
    pub fn with_frequency(mut self, hz: f32) -> Self {
        self.frequency = hz;
        self
    }

    /// Configured frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Check frequency and parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::InvalidFrequency {
                target: "modifier",
                value: self.frequency,
            });
        }
        self.kind.validate()
    }

    /// Advance the throttle by `elapsed` seconds and decide whether the
    /// modifier fires this update.
    ///
    /// A frequency that is not strictly positive (including NaN) has no
    /// period, so the modifier fires on every update.
    pub(crate) fn arm(&mut self, elapsed: f32) {
        self.accumulated += elapsed;
        let unthrottled = self.frequency.is_nan() || self.frequency <= 0.0;
        if unthrottled || self.accumulated >= 1.0 / self.frequency {
            self.pending = Some(self.accumulated);
            self.accumulated = 0.0;
        } else {
            self.pending = None;
        }
    }

    /// Step to apply this update, if the throttle fired.
    #[inline]
    pub(crate) fn pending_step(&self) -> Option<f32> {
        self.pending
    }

    /// Apply the armed step, if any, to `particles`.
    #[inline]
    pub(crate) fn apply_armed(&self, particles: &mut [Particle]) {
        if let Some(step) = self.pending {
            self.kind.apply(step, particles);
        }
    }

    /// Throttle and apply in one call, for driving a modifier by hand.
    pub fn update(&mut self, elapsed: f32, particles: &mut [Particle]) {
        self.arm(elapsed);
        self.apply_armed(particles);
    }
}

impl From<ModifierKind> for Modifier {
    fn from(kind: ModifierKind) -> Self {
        Modifier::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(velocity: Vec2) -> Particle {
        Particle {
            velocity,
            mass: 1.0,
            scale: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_gravity_accelerates() {
        let mut particles = [moving(Vec2::ZERO)];
        ModifierKind::LinearGravity {
            direction: Vec2::new(0.0, 2.0),
            strength: 10.0,
        }
        .apply(0.5, &mut particles);
        assert_eq!(particles[0].velocity, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_zero_drag_is_noop() {
        let before = [moving(Vec2::new(3.0, -4.0)), moving(Vec2::new(100.0, 0.5))];
        let mut after = before;
        ModifierKind::Drag {
            drag_coefficient: 0.0,
            density: 0.0,
        }
        .apply(0.016, &mut after);
        assert_eq!(before, after);

        ModifierKind::Drag {
            drag_coefficient: 0.47,
            density: 0.0,
        }
        .apply(0.016, &mut after);
        assert_eq!(before, after);
    }

    #[test]
    fn test_drag_slows_without_reversing() {
        let mut particles = [moving(Vec2::new(10.0, 0.0))];
        let drag = ModifierKind::Drag {
            drag_coefficient: 0.47,
            density: 0.125,
        };
        drag.apply(0.1, &mut particles);
        let v = particles[0].velocity.x;
        assert!(v < 10.0 && v > 0.0);

        // A huge step saturates instead of flipping direction.
        drag.apply(1000.0, &mut particles);
        assert!(particles[0].velocity.x >= 0.0);
    }

    #[test]
    fn test_interpolators_follow_age() {
        let mut particles = [Particle {
            age: 0.25,
            ..Default::default()
        }];
        ModifierKind::ScaleInterpolator {
            start: 32.0,
            end: 256.0,
        }
        .apply(0.0, &mut particles);
        assert_eq!(particles[0].scale, 88.0);

        ModifierKind::OpacityInterpolator {
            start: 0.3,
            end: 0.0,
        }
        .apply(0.0, &mut particles);
        assert!((particles[0].opacity - 0.225).abs() < 1e-6);

        ModifierKind::HueInterpolator {
            start: 0.0,
            end: 150.0,
        }
        .apply(0.0, &mut particles);
        assert_eq!(particles[0].colour.x, 37.5);

        ModifierKind::OpacityFastFade.apply(0.0, &mut particles);
        assert_eq!(particles[0].opacity, 0.75);
    }

    #[test]
    fn test_colour_interpolator() {
        let mut particles = [Particle {
            age: 0.5,
            ..Default::default()
        }];
        ModifierKind::ColourInterpolator {
            start: Colour::new(0.0, 0.0, 0.0),
            end: Colour::new(100.0, 1.0, 0.5),
        }
        .apply(0.0, &mut particles);
        assert_eq!(particles[0].colour, Vec3::new(50.0, 0.5, 0.25));
    }

    #[test]
    fn test_rotation_rate() {
        let mut particles = [Particle::default()];
        ModifierKind::Rotation { rate: 2.0 }.apply(0.25, &mut particles);
        assert_eq!(particles[0].rotation, 0.5);
    }

    #[test]
    fn test_container_bounces() {
        let container = ModifierKind::Container {
            position: Vec2::ZERO,
            width: 10.0,
            height: 10.0,
            restitution: 0.5,
        };
        let mut particles = [Particle {
            position: Vec2::new(6.0, 0.0),
            velocity: Vec2::new(4.0, 1.0),
            scale: 0.0,
            ..Default::default()
        }];
        container.apply(0.016, &mut particles);
        assert_eq!(particles[0].position.x, 4.0);
        assert_eq!(particles[0].velocity.x, -2.0);
        assert_eq!(particles[0].velocity.y, 1.0);
    }

    #[test]
    fn test_container_keeps_far_particles_inside() {
        let container = ModifierKind::Container {
            position: Vec2::ZERO,
            width: 2.0,
            height: 2.0,
            restitution: 1.0,
        };
        let mut particles = [Particle {
            position: Vec2::new(-50.0, 50.0),
            velocity: Vec2::new(-1.0, 1.0),
            ..Default::default()
        }];
        container.apply(0.016, &mut particles);
        assert!(particles[0].position.abs().max_element() <= 1.0);
        assert_eq!(particles[0].velocity, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_vortex_pulls_and_caps_speed() {
        let vortex = ModifierKind::Vortex {
            position: Vec2::new(10.0, 0.0),
            mass: 1.0e6,
            max_speed: 50.0,
        };
        let mut particles = [Particle::default()];
        vortex.apply(1.0, &mut particles);
        assert!(particles[0].velocity.x > 0.0);
        assert!(particles[0].velocity.length() <= 50.0 + 1e-3);
    }

    #[test]
    fn test_custom_modifier() {
        let kind = ModifierKind::custom(|p, step| p.mass += step);
        let mut particles = [Particle::default(); 3];
        kind.apply(2.0, &mut particles);
        assert!(particles.iter().all(|p| p.mass == 2.0));
    }

    #[test]
    fn test_frequency_throttle() {
        let mut modifier = Modifier::new(ModifierKind::Rotation { rate: 1.0 }).with_frequency(10.0);
        let mut particles = [Particle::default()];

        // 0.05s is half a period: nothing happens yet.
        modifier.update(0.05, &mut particles);
        assert_eq!(particles[0].rotation, 0.0);

        // Crossing the period applies everything collected so far.
        modifier.update(0.06, &mut particles);
        assert!((particles[0].rotation - 0.11).abs() < 1e-6);
        assert!(modifier.pending_step().is_some());
    }

    #[test]
    fn test_unthrottled_frequencies_fire_every_update() {
        for hz in [0.0, -5.0, f32::NAN] {
            let mut modifier = Modifier::new(ModifierKind::Rotation { rate: 1.0 }).with_frequency(hz);
            let mut particles = [Particle::default()];

            modifier.update(0.01, &mut particles);
            assert_eq!(modifier.pending_step(), Some(0.01));
            modifier.update(0.02, &mut particles);
            assert_eq!(modifier.pending_step(), Some(0.02));
            assert!((particles[0].rotation - 0.03).abs() < 1e-6, "frequency {hz}");
        }
    }

    #[test]
    fn test_validation() {
        assert!(Modifier::new(ModifierKind::OpacityFastFade)
            .with_frequency(0.0)
            .validate()
            .is_err());
        assert!(Modifier::new(ModifierKind::Drag {
            drag_coefficient: -1.0,
            density: 1.0
        })
        .validate()
        .is_err());
        assert!(Modifier::new(ModifierKind::Container {
            position: Vec2::ZERO,
            width: -1.0,
            height: 1.0,
            restitution: 0.5
        })
        .validate()
        .is_err());
        assert!(Modifier::new(ModifierKind::Rotation { rate: 1.0 })
            .validate()
            .is_ok());
    }
}
