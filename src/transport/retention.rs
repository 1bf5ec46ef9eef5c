use std::time::Instant;

use super::beacon::BeaconRequest;

/// Stable address of a retained handle. The generation guards against a
/// stale key clearing a slot that has since been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleKey {
    index: usize,
    generation: u32,
}

impl HandleKey {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One outstanding delivery.
#[derive(Debug, Clone)]
pub struct InFlightHandle {
    pub request: BeaconRequest,
    pub dispatched_at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    handle: Option<InFlightHandle>,
}

/// Slab of in-flight handles. Slots are appended or cleared, never shifted,
/// so keys stay valid for as long as their delivery is pending.
#[derive(Debug, Default)]
pub struct RetentionSet {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl RetentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: InFlightHandle) -> HandleKey {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.handle = Some(handle);
                HandleKey { index, generation: slot.generation }
            }
            None => {
                self.slots.push(Slot { generation: 0, handle: Some(handle) });
                HandleKey { index: self.slots.len() - 1, generation: 0 }
            }
        }
    }

    /// Clears the slot behind `key`. Returns the handle if the key was still live.
    pub fn release(&mut self, key: HandleKey) -> Option<InFlightHandle> {
        let slot = self.slots.get_mut(key.index)?;
        if slot.generation != key.generation {
            return None;
        }
        let handle = slot.handle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.live -= 1;
        Some(handle)
    }

    pub fn get(&self, key: HandleKey) -> Option<&InFlightHandle> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.handle.as_ref())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
