//! Particle emitters.
//!
//! An [`Emitter`] owns a [`ParticleStore`] and drives the particle life
//! cycle:
//!
//! 1. **Trigger** - [`Emitter::trigger_at_point`] or
//!    [`Emitter::trigger_along_segment`] releases a random quantity of new
//!    particles, initialized from the [`Profile`] and [`ReleaseParameters`].
//! 2. **Update** - [`Emitter::update`] advances the emitter clock, reclaims
//!    expired particles at `reclaim_frequency`, ages and moves every live
//!    particle, then runs the modifiers.
//! 3. **Expiry** - particles expire by clock comparison alone and are
//!    removed on the next reclaim pass.
//!
//! Triggers and updates never fail. A full store releases fewer particles.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = Emitter::builder(2000, Duration::from_secs(2), Profile::point())
//!     .parameters(ReleaseParameters {
//!         quantity: RangeI::fixed(10),
//!         speed: RangeF::new(0.0, 100.0),
//!         ..Default::default()
//!     })
//!     .modifier(Modifier::new(ModifierKind::OpacityFastFade).with_frequency(10.0))
//!     .build()?;
//!
//! emitter.trigger_at_point(Vec2::new(400.0, 300.0));
//! emitter.update(1.0 / 60.0);
//! ```

use crate::colour::{Colour, ColourRange};
use crate::error::{ConfigError, Result};
use crate::execution::ModifierExecutionStrategy;
use crate::modifier::Modifier;
use crate::particle::Particle;
use crate::profile::Profile;
use crate::random::{FastRandom, RangeF, RangeI};
use crate::store::ParticleStore;
use crate::visuals::{BlendMode, OrderedParticles, RenderingOrder};
use glam::Vec2;
use std::f32::consts::PI;
use std::time::Duration;

/// Reclaim frequency used when none is configured, in Hz.
pub const DEFAULT_RECLAIM_FREQUENCY: f32 = 60.0;

/// Ranges each released particle is sampled from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReleaseParameters {
    /// Particles released per trigger (inclusive range).
    pub quantity: RangeI,
    /// Initial speed along the profile heading.
    pub speed: RangeF,
    /// Initial colour, in HSL.
    pub colour: ColourRange,
    /// Initial opacity.
    pub opacity: RangeF,
    /// Initial scale.
    pub scale: RangeF,
    /// Initial rotation in radians.
    pub rotation: RangeF,
    /// Particle mass.
    pub mass: RangeF,
}

impl Default for ReleaseParameters {
    fn default() -> Self {
        Self {
            quantity: RangeI::fixed(1),
            speed: RangeF::new(-1.0, 1.0),
            colour: Colour::new(0.0, 0.5, 0.5).into(),
            opacity: RangeF::new(0.0, 1.0),
            scale: RangeF::new(1.0, 10.0),
            rotation: RangeF::new(-PI, PI),
            mass: RangeF::fixed(1.0),
        }
    }
}

impl ReleaseParameters {
    /// Check every range.
    pub fn validate(&self) -> Result<()> {
        self.quantity.validate("quantity")?;
        self.speed.validate("speed")?;
        self.opacity.validate("opacity")?;
        self.scale.validate("scale")?;
        self.rotation.validate("rotation")?;
        self.mass.validate("mass")?;

        let (min, max) = (self.colour.min, self.colour.max);
        for (parameter, lo, hi) in [
            ("colour.h", min.h, max.h),
            ("colour.s", min.s, max.s),
            ("colour.l", min.l, max.l),
        ] {
            RangeF::new(lo, hi).validate(parameter)?;
        }
        Ok(())
    }
}

/// A straight segment between two points, used for trail emission.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment {
    /// Start of the segment.
    pub origin: Vec2,
    /// End of the segment.
    pub end: Vec2,
}

impl LineSegment {
    /// Create a segment.
    pub const fn new(origin: Vec2, end: Vec2) -> Self {
        Self { origin, end }
    }

    /// Vector from `origin` to `end`.
    pub fn to_vector(&self) -> Vec2 {
        self.end - self.origin
    }

    /// Point at parameter `t` (0 = origin, 1 = end).
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.to_vector() * t
    }
}

/// Builder for [`Emitter`]. All validation happens in [`EmitterBuilder::build`].
#[derive(Clone, Debug)]
pub struct EmitterBuilder {
    capacity: usize,
    term: Duration,
    profile: Profile,
    parameters: ReleaseParameters,
    modifiers: Vec<Modifier>,
    strategy: ModifierExecutionStrategy,
    reclaim_frequency: f32,
    blend_mode: BlendMode,
    rendering_order: RenderingOrder,
    texture_key: Option<String>,
    seed: Option<u64>,
}

impl EmitterBuilder {
    /// Set the release parameters.
    pub fn parameters(mut self, parameters: ReleaseParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Append one modifier.
    pub fn modifier(mut self, modifier: impl Into<Modifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Append several modifiers, keeping their order.
    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    /// Choose how the modifier list is executed.
    pub fn strategy(mut self, strategy: ModifierExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// How many times per second expired particles are compacted away.
    pub fn reclaim_frequency(mut self, hz: f32) -> Self {
        self.reclaim_frequency = hz;
        self
    }

    /// Blend mode hint for renderers.
    pub fn blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Rendering order hint for renderers.
    pub fn rendering_order(mut self, order: RenderingOrder) -> Self {
        self.rendering_order = order;
        self
    }

    /// Texture lookup key for renderers.
    pub fn texture_key(mut self, key: impl Into<String>) -> Self {
        self.texture_key = Some(key.into());
        self
    }

    /// Seed the emitter's random source for reproducible releases.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and allocate the particle store.
    pub fn build(self) -> Result<Emitter> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.profile.validate()?;
        self.parameters.validate()?;
        validate_reclaim_frequency(self.reclaim_frequency)?;
        for modifier in &self.modifiers {
            modifier.validate()?;
        }

        log::debug!(
            "building emitter: capacity {}, term {:?}, {} profile, {} modifiers, {:?} strategy",
            self.capacity,
            self.term,
            self.profile.name(),
            self.modifiers.len(),
            self.strategy,
        );

        Ok(Emitter {
            store: ParticleStore::new(self.capacity),
            term: self.term.as_secs_f32(),
            total_seconds: 0.0,
            seconds_since_last_reclaim: 0.0,
            parameters: self.parameters,
            profile: self.profile,
            modifiers: self.modifiers,
            strategy: self.strategy,
            reclaim_frequency: self.reclaim_frequency,
            blend_mode: self.blend_mode,
            rendering_order: self.rendering_order,
            texture_key: self.texture_key,
            rng: match self.seed {
                Some(seed) => FastRandom::seeded(seed),
                None => FastRandom::new(),
            },
            next_id: 0,
        })
    }
}

fn validate_reclaim_frequency(hz: f32) -> Result<()> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(ConfigError::InvalidFrequency {
            target: "reclaim",
            value: hz,
        });
    }
    Ok(())
}

/// Spawns, ages, moves, modifies and reclaims particles.
#[derive(Clone, Debug)]
pub struct Emitter {
    store: ParticleStore,
    term: f32,
    total_seconds: f32,
    seconds_since_last_reclaim: f32,
    parameters: ReleaseParameters,
    profile: Profile,
    modifiers: Vec<Modifier>,
    strategy: ModifierExecutionStrategy,
    reclaim_frequency: f32,
    blend_mode: BlendMode,
    rendering_order: RenderingOrder,
    texture_key: Option<String>,
    rng: FastRandom,
    next_id: u32,
}

impl Emitter {
    /// Start configuring an emitter.
    ///
    /// - `capacity` - maximum number of live particles
    /// - `term` - lifetime given to every released particle
    /// - `profile` - shape particles are released from
    pub fn builder(capacity: usize, term: Duration, profile: Profile) -> EmitterBuilder {
        EmitterBuilder {
            capacity,
            term,
            profile,
            parameters: ReleaseParameters::default(),
            modifiers: Vec::new(),
            strategy: ModifierExecutionStrategy::default(),
            reclaim_frequency: DEFAULT_RECLAIM_FREQUENCY,
            blend_mode: BlendMode::default(),
            rendering_order: RenderingOrder::default(),
            texture_key: None,
            seed: None,
        }
    }

    /// Emitter with default parameters, no modifiers and serial execution.
    pub fn new(capacity: usize, term: Duration, profile: Profile) -> Result<Self> {
        Self::builder(capacity, term, profile).build()
    }

    // =========================================================================
    // TRIGGERS
    // =========================================================================

    /// Release a sampled quantity of particles around `position`.
    ///
    /// Returns how many particles were actually released, which is lower
    /// than requested when the store is full.
    pub fn trigger_at_point(&mut self, position: Vec2) -> usize {
        let quantity = self.rng.next_integer_in(self.parameters.quantity) as usize;
        self.release(position, quantity)
    }

    /// Release a sampled quantity of particles, one at a time, at uniformly
    /// random points along `segment`.
    ///
    /// Models trail emission such as a dragged cursor. Returns how many
    /// particles were released.
    pub fn trigger_along_segment(&mut self, segment: LineSegment) -> usize {
        let quantity = self.rng.next_integer_in(self.parameters.quantity);
        let mut released = 0;
        for _ in 0..quantity {
            let position = segment.point_at(self.rng.next_single());
            if self.release(position, 1) == 0 {
                break;
            }
            released += 1;
        }
        released
    }

    fn release(&mut self, position: Vec2, quantity: usize) -> usize {
        let Self {
            store,
            term,
            total_seconds,
            parameters,
            profile,
            rng,
            next_id,
            ..
        } = self;

        let slots = store.allocate(quantity);
        if slots.len() < quantity {
            log::trace!(
                "store saturated: released {} of {} requested particles",
                slots.len(),
                quantity
            );
        }

        for slot in slots.iter_mut() {
            let (offset, heading) = profile.sample(rng);
            let speed = rng.next_single_in(parameters.speed);

            *slot = Particle {
                id: *next_id,
                inception: *total_seconds,
                age: 0.0,
                position: position + offset,
                velocity: heading * speed,
                colour: rng.next_colour(&parameters.colour).into(),
                opacity: rng.next_single_in(parameters.opacity),
                scale: rng.next_single_in(parameters.scale),
                rotation: rng.next_single_in(parameters.rotation),
                mass: rng.next_single_in(parameters.mass),
                lifetime: *term,
            };
            *next_id = next_id.wrapping_add(1);
        }

        slots.len()
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Advance the emitter by `elapsed_seconds`.
    pub fn update(&mut self, elapsed_seconds: f32) {
        self.total_seconds += elapsed_seconds;
        self.seconds_since_last_reclaim += elapsed_seconds;

        let reclaim_period = 1.0 / self.reclaim_frequency;
        if self.store.is_empty() {
            // Idle time must not queue up a backlog of reclaim passes.
            self.seconds_since_last_reclaim = self.seconds_since_last_reclaim.min(reclaim_period);
            return;
        }

        if self.seconds_since_last_reclaim > reclaim_period {
            self.store.reclaim_expired(self.total_seconds);
            self.seconds_since_last_reclaim -= reclaim_period;
        }

        let now = self.total_seconds;
        let particles = self.store.live_view_mut();
        for particle in particles.iter_mut() {
            particle.refresh_age(now);
            particle.position += particle.velocity * elapsed_seconds;
        }

        self.strategy
            .execute(&mut self.modifiers, elapsed_seconds, particles);
    }

    /// Run a reclaim pass now, against the current clock.
    ///
    /// Returns how many particles were removed.
    pub fn reclaim_expired(&mut self) -> usize {
        self.store.reclaim_expired(self.total_seconds)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Number of live particles.
    pub fn active_particle_count(&self) -> u32 {
        u32::try_from(self.store.len()).unwrap_or(u32::MAX)
    }

    /// Maximum number of live particles.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Live particles in stored order (oldest first).
    pub fn live_particles(&self) -> &[Particle] {
        self.store.live_view()
    }

    /// Live particles in this emitter's rendering order.
    pub fn ordered_particles(&self) -> OrderedParticles<'_> {
        self.live_particle_view(self.rendering_order)
    }

    /// Live particles in a caller-chosen order. The stored order never changes.
    pub fn live_particle_view(&self, order: RenderingOrder) -> OrderedParticles<'_> {
        self.store.iter(order)
    }

    /// The underlying particle store.
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Emitter clock in seconds.
    pub fn total_seconds(&self) -> f32 {
        self.total_seconds
    }

    /// Lifetime given to released particles, in seconds.
    pub fn term(&self) -> f32 {
        self.term
    }

    /// Release profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Current release parameters.
    pub fn parameters(&self) -> &ReleaseParameters {
        &self.parameters
    }

    /// Replace the release parameters. Rejected parameters leave the emitter unchanged.
    pub fn set_parameters(&mut self, parameters: ReleaseParameters) -> Result<()> {
        parameters.validate()?;
        self.parameters = parameters;
        Ok(())
    }

    /// Modifiers in execution order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Mutable modifier list.
    ///
    /// Changes made here are not validated. A modifier whose frequency is
    /// zero, negative or NaN fires on every update.
    pub fn modifiers_mut(&mut self) -> &mut Vec<Modifier> {
        &mut self.modifiers
    }

    /// Validate and append a modifier.
    pub fn push_modifier(&mut self, modifier: impl Into<Modifier>) -> Result<()> {
        let modifier = modifier.into();
        modifier.validate()?;
        self.modifiers.push(modifier);
        Ok(())
    }

    /// Current execution strategy.
    pub fn strategy(&self) -> ModifierExecutionStrategy {
        self.strategy
    }

    /// Switch execution strategy. Takes effect on the next update.
    pub fn set_strategy(&mut self, strategy: ModifierExecutionStrategy) {
        if strategy != self.strategy {
            log::debug!("modifier strategy {:?} -> {:?}", self.strategy, strategy);
        }
        self.strategy = strategy;
    }

    /// Reclaim passes per second.
    pub fn reclaim_frequency(&self) -> f32 {
        self.reclaim_frequency
    }

    /// Change how often expired particles are reclaimed.
    pub fn set_reclaim_frequency(&mut self, hz: f32) -> Result<()> {
        validate_reclaim_frequency(hz)?;
        self.reclaim_frequency = hz;
        Ok(())
    }

    /// Blend mode hint.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Rendering order hint.
    pub fn rendering_order(&self) -> RenderingOrder {
        self.rendering_order
    }

    /// Change the rendering order hint.
    pub fn set_rendering_order(&mut self, order: RenderingOrder) {
        self.rendering_order = order;
    }

    /// Texture lookup key, if any.
    pub fn texture_key(&self) -> Option<&str> {
        self.texture_key.as_deref()
    }
}
