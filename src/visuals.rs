//! Renderer-facing emitter metadata.
//!
//! ember does not draw anything. These settings travel with an emitter so a
//! renderer knows how to blend its particles, which texture to use, and in
//! which order to walk the live view.
//!
//! ```ignore
//! let emitter = Emitter::builder(2000, Duration::from_secs(3), Profile::point())
//!     .blend_mode(BlendMode::Alpha)
//!     .rendering_order(RenderingOrder::BackToFront)
//!     .texture_key("Cloud")
//!     .build()?;
//! ```

use crate::particle::Particle;
use std::iter::FusedIterator;
use std::slice;

/// Blend mode for rendering particles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Standard alpha blending (default).
    ///
    /// Good for smoke and other soft, occluding particles.
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Overlapping particles become brighter. Suits sparks, fire and magic.
    Additive,
}

/// Order in which a renderer walks the live particles.
///
/// This never changes the stored order, only the iteration direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderingOrder {
    /// Oldest particle first.
    #[default]
    FrontToBack,
    /// Newest particle first.
    BackToFront,
}

/// Iterator over live particles in a chosen [`RenderingOrder`].
#[derive(Clone, Debug)]
pub struct OrderedParticles<'a> {
    inner: slice::Iter<'a, Particle>,
    order: RenderingOrder,
}

impl<'a> OrderedParticles<'a> {
    pub(crate) fn new(particles: &'a [Particle], order: RenderingOrder) -> Self {
        Self {
            inner: particles.iter(),
            order,
        }
    }
}

impl<'a> Iterator for OrderedParticles<'a> {
    type Item = &'a Particle;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            RenderingOrder::FrontToBack => self.inner.next(),
            RenderingOrder::BackToFront => self.inner.next_back(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for OrderedParticles<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        match self.order {
            RenderingOrder::FrontToBack => self.inner.next_back(),
            RenderingOrder::BackToFront => self.inner.next(),
        }
    }
}

impl ExactSizeIterator for OrderedParticles<'_> {}

impl FusedIterator for OrderedParticles<'_> {}
