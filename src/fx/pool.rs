//! Slot arena with a bounded free list of inert particles.
//!
//! Every particle lives in `slots`. A slot is either active (owned by the
//! engine's active list), pooled (holds a parked particle, listed in
//! `free`), or vacant (`None`, listed in `vacant`). Only up to `capacity`
//! slots may be pooled at once; releases beyond that become vacant.

use super::particle::Particle;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SlotId(usize);

pub struct ParticlePool {
    slots: Vec<Option<Particle>>,
    free: Vec<SlotId>,
    vacant: Vec<SlotId>,
    capacity: usize,
}

impl ParticlePool {
    /// Pool pre-filled with `capacity` inert particles.
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Option<Particle>> = (0..capacity).map(|_| Some(Particle::inert())).collect();
        let free = (0..capacity).rev().map(SlotId).collect();
        ParticlePool { slots, free, vacant: Vec::new(), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of parked particles ready for reuse.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Pop a parked slot, if any.
    pub fn take_pooled(&mut self) -> Option<SlotId> {
        self.free.pop()
    }

    /// Place `particle` in a slot, reusing a parked one when available.
    pub fn acquire(&mut self, particle: Particle) -> SlotId {
        if let Some(id) = self.take_pooled() {
            self.slots[id.0] = Some(particle);
            return id;
        }
        match self.vacant.pop() {
            Some(id) => {
                self.slots[id.0] = Some(particle);
                id
            }
            None => {
                self.slots.push(Some(particle));
                SlotId(self.slots.len() - 1)
            }
        }
    }

    /// Return a slot. Parked if the pool has room, discarded otherwise.
    pub fn release(&mut self, id: SlotId) {
        let Some(slot) = self.slots.get_mut(id.0) else { return };
        if self.free.len() < self.capacity {
            if let Some(p) = slot.as_mut() {
                p.park();
                self.free.push(id);
                return;
            }
        }
        if slot.take().is_some() {
            self.vacant.push(id);
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&Particle> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Particle> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    #[cfg(test)]
    pub(crate) fn forget(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = None;
        }
    }
}
