//! The particle record.
//!
//! A [`Particle`] is plain data with a fixed, tightly packed layout so a
//! renderer can copy a whole live view into a vertex buffer in one go.
//!
//! # Layout
//!
//! | Field | Type | Offset |
//! |-------|------|--------|
//! | `id` | `u32` | 0 |
//! | `inception` | `f32` | 4 |
//! | `age` | `f32` | 8 |
//! | `position` | `Vec2` | 12 |
//! | `velocity` | `Vec2` | 20 |
//! | `colour` | `Vec3` | 28 |
//! | `opacity` | `f32` | 40 |
//! | `scale` | `f32` | 44 |
//! | `rotation` | `f32` | 48 |
//! | `mass` | `f32` | 52 |
//! | `lifetime` | `f32` | 56 |
//!
//! Every field is 4-byte aligned, so there is no padding and the record is
//! 60 bytes.

use glam::{Vec2, Vec3};
use std::mem::{offset_of, size_of};

/// A single simulated particle.
///
/// Liveness is positional: a particle is alive while it sits below the
/// active buffer's count in its [`ParticleStore`](crate::ParticleStore).
/// There is no alive flag.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    /// Emitter-assigned serial number, for external correlation only.
    pub id: u32,
    /// Emitter clock reading when the particle was released.
    pub inception: f32,
    /// Normalized lifetime fraction in `[0, 1]`.
    pub age: f32,
    /// World position.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Three colour channels. The emitter writes HSL; interpretation is up to the renderer.
    pub colour: Vec3,
    /// Opacity, usually `[0, 1]`.
    pub opacity: f32,
    /// Visual size.
    pub scale: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Mass used by drag and vortex modifiers.
    pub mass: f32,
    /// Lifetime in seconds.
    pub lifetime: f32,
}

impl Particle {
    /// Size of one particle record in bytes.
    pub const SIZE_IN_BYTES: usize = size_of::<Particle>();

    /// Byte offset of `age`.
    pub const AGE_OFFSET: usize = offset_of!(Particle, age);
    /// Byte offset of `position`.
    pub const POSITION_OFFSET: usize = offset_of!(Particle, position);
    /// Byte offset of `colour`.
    pub const COLOUR_OFFSET: usize = offset_of!(Particle, colour);
    /// Byte offset of `opacity`.
    pub const OPACITY_OFFSET: usize = offset_of!(Particle, opacity);
    /// Byte offset of `scale`.
    pub const SCALE_OFFSET: usize = offset_of!(Particle, scale);
    /// Byte offset of `rotation`.
    pub const ROTATION_OFFSET: usize = offset_of!(Particle, rotation);

    /// View a run of particles as raw bytes for bulk upload.
    pub fn as_bytes(particles: &[Particle]) -> &[u8] {
        bytemuck::cast_slice(particles)
    }

    /// Recompute `age` from the emitter clock.
    ///
    /// Particles with a non-positive lifetime are fully aged immediately.
    #[inline]
    pub fn refresh_age(&mut self, now: f32) {
        self.age = if self.lifetime <= 0.0 {
            1.0
        } else {
            ((now - self.inception) / self.lifetime).min(1.0)
        };
    }

    /// Whether the particle survives a reclaim pass at `now`.
    ///
    /// The boundary is inclusive: a particle whose lifetime ends exactly at
    /// `now` is kept until the next pass.
    #[inline]
    pub fn is_alive_at(&self, now: f32) -> bool {
        now - self.inception <= self.lifetime
    }
}
