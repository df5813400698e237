//! Generation-checked handle tables.
//!
//! A handle packs `slot index + 1` into its low 32 bits and the slot's
//! generation into the high 32 bits, so `0` is never a live handle. Removing
//! an entry bumps the slot generation, which makes every earlier handle for
//! that slot permanently stale.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("null handle")]
    Null,
    #[error("unknown handle {0:#x}")]
    Unknown(u64),
    #[error("stale handle {0:#x} (already destroyed)")]
    Stale(u64),
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

struct Table<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

/// Thread-safe table mapping opaque `u64` handles to owned values.
pub struct HandleRegistry<T> {
    table: Mutex<Table<T>>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(index: u32, generation: u32) -> u64 {
    (u64::from(generation) << 32) | (u64::from(index) + 1)
}

fn decode(handle: u64) -> Option<(usize, u32)> {
    let low = (handle & 0xffff_ffff) as u32;
    let index = low.checked_sub(1)?;
    Some((index as usize, (handle >> 32) as u32))
}

impl<T> HandleRegistry<T> {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                slots: Vec::new(),
                free: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table<T>> {
        // A panic while holding the lock never leaves a slot half-written.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` and return its handle.
    pub fn insert(&self, value: T) -> u64 {
        let mut table = self.lock();
        if let Some(index) = table.free.pop() {
            let slot = &mut table.slots[index as usize];
            slot.value = Some(value);
            return encode(index, slot.generation);
        }
        let index = table.slots.len() as u32;
        table.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        encode(index, 0)
    }

    /// Remove and return the value behind `handle`.
    ///
    /// The slot is reused by later inserts under a new generation. A slot
    /// whose generation would wrap is retired instead.
    pub fn remove(&self, handle: u64) -> Result<T, HandleError> {
        let mut guard = self.lock();
        let table = &mut *guard;
        let index = Self::check(table, handle)?;
        let slot = &mut table.slots[index];
        let value = slot.value.take().ok_or(HandleError::Stale(handle))?;
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                table.free.push(index as u32);
            }
            None => tracing::debug!(index, "retiring handle slot"),
        }
        Ok(value)
    }

    /// Run `f` with shared access to the value behind `handle`.
    ///
    /// The registry stays locked while `f` runs; keep it short.
    pub fn with<R>(&self, handle: u64, f: impl FnOnce(&T) -> R) -> Result<R, HandleError> {
        let table = self.lock();
        let index = Self::check(&table, handle)?;
        let value = table.slots[index]
            .value
            .as_ref()
            .ok_or(HandleError::Stale(handle))?;
        Ok(f(value))
    }

    /// Run `f` with exclusive access to the value behind `handle`.
    pub fn with_mut<R>(
        &self,
        handle: u64,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, HandleError> {
        let mut table = self.lock();
        let index = Self::check(&table, handle)?;
        let value = table.slots[index]
            .value
            .as_mut()
            .ok_or(HandleError::Stale(handle))?;
        Ok(f(value))
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.with(handle, |_| ()).is_ok()
    }

    pub fn len(&self) -> usize {
        self.lock()
            .slots
            .iter()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(table: &Table<T>, handle: u64) -> Result<usize, HandleError> {
        if handle == 0 {
            return Err(HandleError::Null);
        }
        let (index, generation) = decode(handle).ok_or(HandleError::Unknown(handle))?;
        let slot = table.slots.get(index).ok_or(HandleError::Unknown(handle))?;
        if slot.generation < generation {
            return Err(HandleError::Unknown(handle));
        }
        if slot.generation != generation || slot.value.is_none() {
            return Err(HandleError::Stale(handle));
        }
        Ok(index)
    }
}

impl<T: Clone> HandleRegistry<T> {
    /// Clone the value behind `handle` out of the table.
    pub fn get(&self, handle: u64) -> Result<T, HandleError> {
        self.with(handle, T::clone)
    }
}
