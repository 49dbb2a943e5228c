//! # Ember - Emitter-driven 2D particle engine
//!
//! CPU particle simulation for games and visual effects, with a simple,
//! declarative API.
//!
//! Ember owns the particle memory, spawns and ages particles, integrates
//! their motion and runs a list of modifiers over them every frame. It draws
//! nothing: renderers read the live particles as a tightly packed
//! [`Particle`] slice and upload it however they like.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ember::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> ember::Result<()> {
//!     let mut emitter = Emitter::builder(2000, Duration::from_secs(2), Profile::point())
//!         .parameters(ReleaseParameters {
//!             quantity: RangeI::fixed(10),
//!             speed: RangeF::new(0.0, 100.0),
//!             ..Default::default()
//!         })
//!         .modifier(Modifier::new(ModifierKind::LinearGravity {
//!             direction: Vec2::Y,
//!             strength: 30.0,
//!         }))
//!         .modifier(ModifierKind::OpacityFastFade)
//!         .build()?;
//!
//!     loop {
//!         emitter.trigger_at_point(Vec2::new(400.0, 300.0));
//!         emitter.update(1.0 / 60.0);
//!         upload(Particle::as_bytes(emitter.live_particles()));
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] is a plain `#[repr(C)]` record (position, velocity, colour,
//! opacity, scale, rotation, mass, plus its birth time and lifetime). A
//! particle is alive exactly while it sits in the live range of its
//! emitter's [`ParticleStore`]; there is no alive flag.
//!
//! ### Emitters
//!
//! An [`Emitter`] releases particles on demand from an emission
//! [`Profile`]:
//!
//! | Profile | Offset | Heading |
//! |---------|--------|---------|
//! | `Point` | none | random |
//! | `Line` | along the axis | perpendicular to it |
//! | `Ring` / `Circle` | on / inside the circle | outward or random |
//! | `Spray` | none | within `spread` of `direction` |
//! | `Box` / `BoxFill` | on / inside the rectangle | random |
//!
//! Every update advances the clock, reclaims expired particles at
//! `reclaim_frequency`, ages and moves the survivors, then runs modifiers.
//!
//! ### Modifiers
//!
//! Modifiers run in list order, each at its own frequency:
//!
//! ```ignore
//! .modifier(Modifier::new(ModifierKind::Drag { drag_coefficient: 0.47, density: 0.125 }).with_frequency(10.0))
//! .modifier(Modifier::new(ModifierKind::ScaleInterpolator { start: 32.0, end: 256.0 }))
//! .modifier(Modifier::new(ModifierKind::custom(|p, dt| p.rotation += dt)))
//! ```
//!
//! [`ModifierExecutionStrategy::Parallel`] spreads the modifier pass over
//! the rayon pool. Its results are identical to the serial strategy.
//!
//! ### Effects
//!
//! A [`ParticleEffect`] groups emitters and ships with presets:
//! [`ParticleEffect::smoke`], [`ParticleEffect::sparks`],
//! [`ParticleEffect::rings`] and [`ParticleEffect::load_test`].
//!
//! ## Logging
//!
//! Ember logs through the [`log`](https://docs.rs/log) facade. Install any
//! logger (for example `env_logger`) to see construction at `debug` level
//! and reclaim passes at `trace` level.
//!
//! ## Features
//!
//! - `serde` - `Serialize`/`Deserialize` for every configuration type.

pub mod colour;
pub mod effect;
pub mod emitter;
pub mod error;
pub mod execution;
pub mod modifier;
pub mod particle;
pub mod profile;
pub mod random;
pub mod store;
pub mod visuals;

pub use bytemuck;
pub use colour::{Colour, ColourRange};
pub use effect::ParticleEffect;
pub use emitter::{Emitter, EmitterBuilder, LineSegment, ReleaseParameters};
pub use error::{ConfigError, Result};
pub use execution::ModifierExecutionStrategy;
pub use glam::{Vec2, Vec3};
pub use modifier::{CustomModifier, Modifier, ModifierKind};
pub use particle::Particle;
pub use profile::Profile;
pub use random::{FastRandom, RangeF, RangeI};
pub use store::ParticleStore;
pub use visuals::{BlendMode, OrderedParticles, RenderingOrder};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ember::prelude::*;
/// ```
pub mod prelude {
    pub use crate::colour::{Colour, ColourRange};
    pub use crate::effect::ParticleEffect;
    pub use crate::emitter::{Emitter, LineSegment, ReleaseParameters};
    pub use crate::execution::ModifierExecutionStrategy;
    pub use crate::modifier::{Modifier, ModifierKind};
    pub use crate::particle::Particle;
    pub use crate::profile::Profile;
    pub use crate::random::{RangeF, RangeI};
    pub use crate::visuals::{BlendMode, RenderingOrder};
    pub use glam::{Vec2, Vec3};
}
