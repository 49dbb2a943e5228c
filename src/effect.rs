//! Groups of emitters that act as one effect.
//!
//! A [`ParticleEffect`] forwards triggers and updates to each of its
//! emitters in order. Emitters never share particles.
//!
//! # Presets
//!
//! Ready-made effects for common looks:
//!
//! | Preset | Look | Emitter capacity |
//! |--------|------|------------------|
//! | [`ParticleEffect::smoke`] | Slow, expanding grey clouds | 2 000 |
//! | [`ParticleEffect::sparks`] | Additive sparks falling under gravity | 2 000 |
//! | [`ParticleEffect::rings`] | Upward spray bouncing inside the world | 2 000 |
//! | [`ParticleEffect::load_test`] | Ten thousand pixels per trigger | 1 000 000 |
//!
//! ```ignore
//! let mut effect = ParticleEffect::sparks()?;
//! effect.trigger_at_point(Vec2::new(640.0, 360.0));
//! effect.update(1.0 / 60.0);
//! ```

use crate::colour::{Colour, ColourRange};
use crate::emitter::{Emitter, LineSegment, ReleaseParameters};
use crate::error::Result;
use crate::execution::ModifierExecutionStrategy;
use crate::modifier::{Modifier, ModifierKind};
use crate::profile::Profile;
use crate::random::{RangeF, RangeI};
use crate::visuals::{BlendMode, RenderingOrder};
use glam::Vec2;
use std::f32::consts::PI;
use std::time::Duration;

/// A named, ordered collection of emitters.
#[derive(Clone, Debug, Default)]
pub struct ParticleEffect {
    /// Display name.
    pub name: String,
    emitters: Vec<Emitter>,
}

impl ParticleEffect {
    /// Create an empty effect.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::debug!("creating effect `{name}`");
        Self {
            name,
            emitters: Vec::new(),
        }
    }

    /// Add an emitter, builder style.
    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.push(emitter);
        self
    }

    /// Add an emitter.
    pub fn push(&mut self, emitter: Emitter) {
        log::debug!(
            "effect `{}`: adding emitter {} of capacity {}",
            self.name,
            self.emitters.len(),
            emitter.capacity()
        );
        self.emitters.push(emitter);
    }

    /// Emitters in trigger and update order.
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Mutable access to the emitters, for runtime reconfiguration.
    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    /// Trigger every emitter at `position`. Returns the total released.
    pub fn trigger_at_point(&mut self, position: Vec2) -> usize {
        self.emitters
            .iter_mut()
            .map(|e| e.trigger_at_point(position))
            .sum()
    }

    /// Trigger every emitter along `segment`. Returns the total released.
    pub fn trigger_along_segment(&mut self, segment: LineSegment) -> usize {
        self.emitters
            .iter_mut()
            .map(|e| e.trigger_along_segment(segment))
            .sum()
    }

    /// Advance every emitter by `elapsed_seconds`.
    pub fn update(&mut self, elapsed_seconds: f32) {
        for emitter in &mut self.emitters {
            emitter.update(elapsed_seconds);
        }
    }

    /// Live particles across all emitters.
    pub fn active_particle_count(&self) -> u32 {
        self.emitters
            .iter()
            .fold(0u32, |sum, e| sum.saturating_add(e.active_particle_count()))
    }

    /// Combined capacity of all emitters.
    pub fn capacity(&self) -> usize {
        self.emitters.iter().map(Emitter::capacity).sum()
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Smoke preset: soft grey clouds that drift, spin and grow.
    ///
    /// Alpha blended, drawn newest first, texture key `"Cloud"`.
    pub fn smoke() -> Result<Self> {
        let emitter = Emitter::builder(2000, Duration::from_secs(3), Profile::point())
            .parameters(ReleaseParameters {
                quantity: RangeI::fixed(5),
                speed: RangeF::new(0.0, 100.0),
                colour: Colour::new(0.0, 0.0, 0.6).into(),
                opacity: RangeF::fixed(1.0),
                scale: RangeF::fixed(32.0),
                rotation: RangeF::new(-PI, PI),
                mass: RangeF::new(8.0, 12.0),
            })
            .reclaim_frequency(5.0)
            .blend_mode(BlendMode::Alpha)
            .rendering_order(RenderingOrder::BackToFront)
            .texture_key("Cloud")
            .modifier(
                Modifier::new(ModifierKind::Drag {
                    drag_coefficient: 0.47,
                    density: 0.125,
                })
                .with_frequency(10.0),
            )
            .modifier(
                Modifier::new(ModifierKind::ScaleInterpolator {
                    start: 32.0,
                    end: 256.0,
                })
                .with_frequency(60.0),
            )
            .modifier(Modifier::new(ModifierKind::Rotation { rate: 1.0 }).with_frequency(15.0))
            .modifier(
                Modifier::new(ModifierKind::OpacityInterpolator {
                    start: 0.3,
                    end: 0.0,
                })
                .with_frequency(25.0),
            )
            .build()?;

        Ok(Self::new("smoke").with_emitter(emitter))
    }

    /// Sparks preset: bright yellow sparks that fall and fade fast.
    ///
    /// Additive blending, texture key `"Particle"`.
    pub fn sparks() -> Result<Self> {
        let emitter = Emitter::builder(2000, Duration::from_secs(2), Profile::point())
            .parameters(ReleaseParameters {
                quantity: RangeI::fixed(10),
                speed: RangeF::new(0.0, 100.0),
                colour: Colour::new(50.0, 0.8, 0.5).into(),
                opacity: RangeF::fixed(1.0),
                scale: RangeF::fixed(64.0),
                mass: RangeF::new(8.0, 12.0),
                ..Default::default()
            })
            .reclaim_frequency(5.0)
            .blend_mode(BlendMode::Additive)
            .texture_key("Particle")
            .modifier(gravity(30.0).with_frequency(15.0))
            .modifier(Modifier::new(ModifierKind::OpacityFastFade).with_frequency(10.0))
            .build()?;

        Ok(Self::new("sparks").with_emitter(emitter))
    }

    /// Rings preset: a narrow upward spray of blue rings that fall back and
    /// bounce off the edges of a `world_size` rectangle anchored at the origin.
    pub fn rings(world_size: Vec2) -> Result<Self> {
        let emitter = Emitter::builder(2000, Duration::from_secs(3), Profile::spray(Vec2::NEG_Y, 0.5))
            .parameters(ReleaseParameters {
                quantity: RangeI::fixed(1),
                speed: RangeF::new(300.0, 700.0),
                colour: ColourRange::new(Colour::new(210.0, 0.5, 0.6), Colour::new(230.0, 0.7, 0.8)),
                opacity: RangeF::fixed(1.0),
                scale: RangeF::fixed(64.0),
                mass: RangeF::new(4.0, 12.0),
                ..Default::default()
            })
            .reclaim_frequency(5.0)
            .texture_key("Ring")
            .modifier(gravity(100.0).with_frequency(20.0))
            .modifier(Modifier::new(ModifierKind::OpacityFastFade).with_frequency(10.0))
            .modifier(container(world_size).with_frequency(15.0))
            .build()?;

        Ok(Self::new("rings").with_emitter(emitter))
    }

    /// Load test preset: a million-particle emitter releasing ten thousand
    /// pixels per trigger, with five modifiers running.
    ///
    /// Uses the parallel strategy.
    pub fn load_test(world_size: Vec2) -> Result<Self> {
        let emitter = Emitter::builder(1_000_000, Duration::from_secs(2), Profile::point())
            .parameters(ReleaseParameters {
                quantity: RangeI::fixed(10_000),
                speed: RangeF::new(0.0, 200.0),
                opacity: RangeF::fixed(0.4),
                scale: RangeF::fixed(1.0),
                mass: RangeF::new(4.0, 12.0),
                ..Default::default()
            })
            .reclaim_frequency(5.0)
            .blend_mode(BlendMode::Additive)
            .texture_key("Pixel")
            .strategy(ModifierExecutionStrategy::Parallel)
            .modifier(gravity(30.0).with_frequency(15.0))
            .modifier(Modifier::new(ModifierKind::OpacityFastFade).with_frequency(10.0))
            .modifier(container(world_size).with_frequency(30.0))
            .modifier(
                Modifier::new(ModifierKind::Drag {
                    drag_coefficient: 0.47,
                    density: 0.125,
                })
                .with_frequency(10.0),
            )
            .modifier(
                Modifier::new(ModifierKind::HueInterpolator {
                    start: 0.0,
                    end: 150.0,
                })
                .with_frequency(10.0),
            )
            .build()?;

        Ok(Self::new("load test").with_emitter(emitter))
    }
}

/// Downward pull in screen space (y grows downward).
fn gravity(strength: f32) -> Modifier {
    Modifier::new(ModifierKind::LinearGravity {
        direction: Vec2::Y,
        strength,
    })
}

fn container(world_size: Vec2) -> Modifier {
    Modifier::new(ModifierKind::Container {
        position: world_size / 2.0,
        width: world_size.x,
        height: world_size.y,
        restitution: 0.75,
    })
}
