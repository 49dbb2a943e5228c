//! How the modifier list is run over a live particle range.
//!
//! Execution happens in two phases. First every modifier's throttle is
//! advanced on the calling thread, which decides the step each modifier
//! fires with this update. Then the armed modifiers are applied to the
//! particles, either in one pass per modifier ([`ModifierExecutionStrategy::Serial`])
//! or per chunk on the rayon pool ([`ModifierExecutionStrategy::Parallel`]).
//!
//! Both strategies do the same arithmetic on each particle in the same
//! order, so their results are bit-identical. Only the schedule differs.

use crate::modifier::Modifier;
use crate::particle::Particle;
use rayon::prelude::*;

/// Smallest chunk handed to a worker. Shorter ranges run on the calling thread.
pub const MIN_PARALLEL_CHUNK: usize = 1024;

/// Policy for applying modifiers to live particles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierExecutionStrategy {
    /// Apply each modifier to the whole range before the next one.
    #[default]
    Serial,

    /// Split the range into contiguous chunks and run the whole modifier
    /// list over each chunk on the rayon pool. Joins before returning.
    Parallel,
}

impl ModifierExecutionStrategy {
    /// Run `modifiers` in order over `particles`.
    pub fn execute(&self, modifiers: &mut [Modifier], elapsed_seconds: f32, particles: &mut [Particle]) {
        for modifier in modifiers.iter_mut() {
            modifier.arm(elapsed_seconds);
        }

        if particles.is_empty() || modifiers.iter().all(|m| m.pending_step().is_none()) {
            return;
        }

        let modifiers: &[Modifier] = modifiers;
        match self {
            ModifierExecutionStrategy::Serial => {
                for modifier in modifiers {
                    modifier.apply_armed(particles);
                }
            }
            ModifierExecutionStrategy::Parallel => {
                let chunk_len = chunk_len(particles.len());
                if chunk_len >= particles.len() {
                    for modifier in modifiers {
                        modifier.apply_armed(particles);
                    }
                    return;
                }

                particles.par_chunks_mut(chunk_len).for_each(|chunk| {
                    for modifier in modifiers {
                        modifier.apply_armed(chunk);
                    }
                });
            }
        }
    }
}

/// Chunk length that gives each worker roughly one contiguous slice.
fn chunk_len(len: usize) -> usize {
    let workers = rayon::current_num_threads().max(1);
    len.div_ceil(workers).max(MIN_PARALLEL_CHUNK)
}
