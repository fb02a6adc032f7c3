//! Fixed-capacity mailbox between the ingest and egress loops
//!
//! A pool of `N` slots, each moving through explicit ownership states:
//!
//! ```text
//!       try_alloc          publish           try_take          release
//! Free ──────────▶ Producer ──────▶ Queued ──────────▶ Consumer ──────▶ Free
//! ```
//!
//! Every transition runs under one critical-section mutex, so the four
//! operations are atomic with respect to each other from any number of
//! tasks, threads or interrupt handlers. None of them ever waits: when all
//! slots are owned `try_alloc` fails immediately and the producer drops its
//! item, and an empty queue makes `try_take` return `None`.
//!
//! Published slots are handed out strictly in publish order.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

/// Current owner of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    Free,
    /// Allocated, not yet published
    Producer,
    /// Published, waiting for a consumer
    Queued,
    /// Taken, waiting for release
    Consumer,
}

/// Exclusive claim on one slot
///
/// Handles are only created by the mailbox and cannot be cloned, so at most
/// one live handle exists per slot. A handle is returned to the mailbox that
/// issued it through [`Mailbox::publish`] or [`Mailbox::release`]; it records
/// the issuing mailbox's address and every other mailbox ignores it. Moving
/// a mailbox invalidates its outstanding handles.
#[must_use = "a slot handle must be published or released, or the mailbox loses capacity"]
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotHandle {
    index: usize,
    owner: usize,
}

impl SlotHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

struct Slot<T> {
    state: SlotState,
    value: Option<T>,
}

struct Inner<T, const N: usize> {
    slots: [Slot<T>; N],
    queue: Deque<usize, N>,
}

impl<T, const N: usize> Inner<T, N> {
    /// Slot behind `handle` if `owner` issued it and it is in `expected` state
    fn owned(
        &mut self,
        owner: usize,
        handle: &SlotHandle,
        expected: SlotState,
    ) -> Option<&mut Slot<T>> {
        if handle.owner != owner {
            warn!("Slot handle {} belongs to another mailbox", handle.index);
            return None;
        }
        let slot = self.slots.get_mut(handle.index)?;
        if slot.state == expected {
            Some(slot)
        } else {
            warn!(
                "Mailbox slot {} is {}, not {}",
                handle.index, slot.state, expected
            );
            None
        }
    }
}

/// Bounded multi-producer/multi-consumer mailbox
pub struct Mailbox<T, const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<T, N>>>,
}

impl<T, const N: usize> Mailbox<T, N> {
    /// Create an empty mailbox; usable in a `static`
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                slots: [const {
                    Slot {
                        state: SlotState::Free,
                        value: None,
                    }
                }; N],
                queue: Deque::new(),
            })),
        }
    }

    /// Identity stamped into the handles this mailbox issues
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<T, N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Claim a free slot for writing
    ///
    /// Returns `None` when every slot is owned by a producer, the queue or a
    /// consumer.
    pub fn try_alloc(&self) -> Option<SlotHandle> {
        let owner = self.id();
        self.with(|inner| {
            let index = inner
                .slots
                .iter()
                .position(|slot| slot.state == SlotState::Free)?;
            inner.slots[index].state = SlotState::Producer;
            Some(SlotHandle { index, owner })
        })
    }

    /// Store `value` in an allocated, unpublished slot
    pub fn write(&self, handle: &SlotHandle, value: T) {
        let owner = self.id();
        self.with(|inner| {
            if let Some(slot) = inner.owned(owner, handle, SlotState::Producer) {
                slot.value = Some(value);
            }
        })
    }

    /// Make an allocated slot visible to consumers, behind every slot
    /// published before it
    pub fn publish(&self, handle: SlotHandle) {
        let owner = self.id();
        self.with(|inner| {
            if let Some(slot) = inner.owned(owner, &handle, SlotState::Producer) {
                slot.state = SlotState::Queued;
                // Only owned slots are queued, so the queue cannot be full here.
                let _ = inner.queue.push_back(handle.index);
            }
        })
    }

    /// Take the oldest published slot
    pub fn try_take(&self) -> Option<SlotHandle> {
        let owner = self.id();
        self.with(|inner| {
            let index = inner.queue.pop_front()?;
            inner.slots[index].state = SlotState::Consumer;
            Some(SlotHandle { index, owner })
        })
    }

    /// Return a taken slot to the free pool
    pub fn release(&self, handle: SlotHandle) {
        let owner = self.id();
        self.with(|inner| {
            if let Some(slot) = inner.owned(owner, &handle, SlotState::Consumer) {
                slot.state = SlotState::Free;
                slot.value = None;
            }
        })
    }

    /// Copy of the value held by a slot the caller owns
    ///
    /// `None` if the producer published without writing, or if `handle`
    /// came from another mailbox.
    pub fn read(&self, handle: &SlotHandle) -> Option<T>
    where
        T: Clone,
    {
        if handle.owner != self.id() {
            return None;
        }
        self.with(|inner| {
            inner
                .slots
                .get(handle.index)
                .and_then(|slot| slot.value.clone())
        })
    }

    /// Number of published slots waiting for a consumer
    pub fn pending(&self) -> usize {
        self.with(|inner| inner.queue.len())
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        self.with(|inner| {
            inner
                .slots
                .iter()
                .filter(|slot| slot.state == SlotState::Free)
                .count()
        })
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for Mailbox<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
