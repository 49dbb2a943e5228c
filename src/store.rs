//! Fixed-capacity, double-buffered particle storage.
//!
//! A [`ParticleStore`] owns two equally sized particle buffers. One is
//! active: its first `count` slots are the live particles. The other is
//! scratch space, used only while reclaiming.
//!
//! - [`ParticleStore::allocate`] hands out slots at the tail of the active
//!   buffer. When the buffer is full it hands out fewer slots instead of
//!   growing.
//! - [`ParticleStore::reclaim_expired`] copies the survivors, in order, into
//!   the scratch buffer and swaps the two roles. This is the only place
//!   slots are freed.
//!
//! Both buffers are allocated once at construction. Nothing allocates
//! afterwards.

use crate::particle::Particle;
use crate::visuals::{OrderedParticles, RenderingOrder};

/// Which of the two buffers is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BufferSlot {
    Front,
    Back,
}

impl BufferSlot {
    fn other(self) -> Self {
        match self {
            BufferSlot::Front => BufferSlot::Back,
            BufferSlot::Back => BufferSlot::Front,
        }
    }

    fn index(self) -> usize {
        match self {
            BufferSlot::Front => 0,
            BufferSlot::Back => 1,
        }
    }
}

/// One contiguous run of particle slots with a logical count.
#[derive(Clone, Debug)]
struct ParticleBuffer {
    slots: Box<[Particle]>,
    count: usize,
}

impl ParticleBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity].into_boxed_slice(),
            count: 0,
        }
    }

    #[inline]
    fn live(&self) -> &[Particle] {
        &self.slots[..self.count]
    }

    #[inline]
    fn live_mut(&mut self) -> &mut [Particle] {
        &mut self.slots[..self.count]
    }

    /// Reserve up to `n` slots at the tail.
    fn release(&mut self, n: usize) -> &mut [Particle] {
        let start = self.count;
        let granted = n.min(self.slots.len() - start);
        self.count += granted;
        &mut self.slots[start..start + granted]
    }

    /// Forget every particle without touching slot contents.
    #[inline]
    fn reset(&mut self) {
        self.count = 0;
    }

    #[inline]
    fn push(&mut self, particle: Particle) {
        self.slots[self.count] = particle;
        self.count += 1;
    }
}

/// Fixed-capacity particle pool with stable compaction.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    buffers: [ParticleBuffer; 2],
    active: BufferSlot,
}

impl ParticleStore {
    /// Create a store holding at most `capacity` live particles.
    ///
    /// Allocates both buffers up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: [ParticleBuffer::new(capacity), ParticleBuffer::new(capacity)],
            active: BufferSlot::Front,
        }
    }

    #[inline]
    fn active(&self) -> &ParticleBuffer {
        &self.buffers[self.active.index()]
    }

    #[inline]
    fn active_mut(&mut self) -> &mut ParticleBuffer {
        &mut self.buffers[self.active.index()]
    }

    /// Maximum number of live particles.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.active().slots.len()
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.active().count
    }

    /// Whether there are no live particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free slots remaining in the active buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Reserve up to `n` slots at the tail of the live range.
    ///
    /// Returns the reserved slots; its length is `min(n, remaining)`. The
    /// slots hold stale data and must be fully written by the caller.
    pub fn allocate(&mut self, n: usize) -> &mut [Particle] {
        self.active_mut().release(n)
    }

    /// Drop every particle that has outlived its lifetime at `now`.
    ///
    /// Survivors keep their relative order. Returns how many particles were
    /// removed.
    pub fn reclaim_expired(&mut self, now: f32) -> usize {
        let [front, back] = &mut self.buffers;
        let (source, dest) = match self.active {
            BufferSlot::Front => (front, back),
            BufferSlot::Back => (back, front),
        };

        dest.reset();
        for particle in source.live() {
            if particle.is_alive_at(now) {
                dest.push(*particle);
            }
        }

        let removed = source.count - dest.count;
        source.reset();
        self.active = self.active.other();

        log::trace!("reclaimed {removed} particles, {} remain", self.len());
        removed
    }

    /// Drop all live particles. Capacity is kept and nothing is freed.
    pub fn reset(&mut self) {
        self.active_mut().reset();
    }

    /// The live particles, oldest first.
    #[inline]
    pub fn live_view(&self) -> &[Particle] {
        self.active().live()
    }

    /// The live particles, mutable in place.
    #[inline]
    pub fn live_view_mut(&mut self) -> &mut [Particle] {
        self.active_mut().live_mut()
    }

    /// Iterate the live particles in the given order.
    pub fn iter(&self, order: RenderingOrder) -> OrderedParticles<'_> {
        OrderedParticles::new(self.live_view(), order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(store: &mut ParticleStore, lifetimes: &[f32]) {
        let slots = store.allocate(lifetimes.len());
        for (i, (slot, &lifetime)) in slots.iter_mut().zip(lifetimes).enumerate() {
            *slot = Particle {
                id: i as u32,
                lifetime,
                ..Default::default()
            };
        }
    }

    #[test]
    fn test_allocate_truncates_at_capacity() {
        let mut store = ParticleStore::new(10);
        assert_eq!(store.allocate(4).len(), 4);
        assert_eq!(store.allocate(4).len(), 4);
        assert_eq!(store.allocate(4).len(), 2);
        assert_eq!(store.allocate(4).len(), 0);
        assert_eq!(store.len(), 10);
        assert_eq!(store.remaining(), 0);
    }

    #[test]
    fn test_reclaim_is_stable() {
        let mut store = ParticleStore::new(8);
        fill(&mut store, &[1.0, 5.0, 1.0, 5.0, 5.0, 1.0]);

        let removed = store.reclaim_expired(2.0);
        assert_eq!(removed, 3);
        let ids: Vec<u32> = store.live_view().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_reclaim_twice_is_idempotent() {
        let mut store = ParticleStore::new(8);
        fill(&mut store, &[1.0, 5.0, 3.0, 0.5]);

        store.reclaim_expired(2.0);
        let first: Vec<Particle> = store.live_view().to_vec();
        assert_eq!(store.reclaim_expired(2.0), 0);
        assert_eq!(store.live_view(), first.as_slice());
    }

    #[test]
    fn test_reclaim_swaps_buffers() {
        let mut store = ParticleStore::new(4);
        fill(&mut store, &[5.0, 5.0]);
        assert_eq!(store.active, BufferSlot::Front);

        store.reclaim_expired(0.0);
        assert_eq!(store.active, BufferSlot::Back);
        assert_eq!(store.buffers[0].count, 0);
        assert_eq!(store.len(), 2);

        // The freed capacity is usable from the new active buffer.
        assert_eq!(store.allocate(10).len(), 2);
    }

    #[test]
    fn test_reclaim_everything() {
        let mut store = ParticleStore::new(4);
        fill(&mut store, &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(store.reclaim_expired(1.5), 4);
        assert!(store.is_empty());
        assert_eq!(store.allocate(4).len(), 4);
    }

    #[test]
    fn test_reclaim_discards_stale_scratch() {
        let mut store = ParticleStore::new(4);
        fill(&mut store, &[5.0, 5.0, 5.0]);
        // Leave stale survivors in the scratch buffer.
        store.buffers[store.active.other().index()].count = 3;
        store.buffers[store.active.other().index()].slots[0].id = 99;

        fill(&mut store, &[5.0]);
        store.reclaim_expired(0.0);
        let ids: Vec<u32> = store.live_view().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 0]);
        assert_eq!(store.buffers[store.active.other().index()].count, 0);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut store = ParticleStore::new(4);
        fill(&mut store, &[1.0, 1.0]);
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 4);
        assert!(store.live_view().is_empty());
    }

    #[test]
    fn test_iter_orders() {
        let mut store = ParticleStore::new(4);
        fill(&mut store, &[1.0, 1.0, 1.0]);
        let back: Vec<u32> = store.iter(RenderingOrder::BackToFront).map(|p| p.id).collect();
        assert_eq!(back, vec![2, 1, 0]);
        let front: Vec<u32> = store.iter(RenderingOrder::FrontToBack).map(|p| p.id).collect();
        assert_eq!(front, vec![0, 1, 2]);
    }
}
