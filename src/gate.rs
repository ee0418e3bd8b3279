// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A counting semaphore built on a bounded channel.  The channel is
//! preloaded with one token per slot: taking a token acquires a slot,
//! and dropping the Permit puts the token back.

use crossbeam::channel::{bounded, Receiver, Sender};

/// Bounds how many units of work may hold a slot at once.
#[derive(Debug)]
pub struct Gate {
    capacity: usize,
    release: Sender<()>,
    acquire: Receiver<()>,
}

/// A held slot.  The slot is returned when the permit is dropped, which
/// may happen on a different thread than the one that acquired it.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Gate {
    /// A gate with `capacity` free slots.  Capacity must be at least one.
    pub fn new(capacity: usize) -> Gate {
        assert!(capacity > 0, "a gate needs at least one slot");
        let (release, acquire) = bounded(capacity);
        for _ in 0..capacity {
            // Cannot fail: the channel has room for exactly these tokens
            // and the receiver is alive.
            let _ = release.try_send(());
        }
        Gate {
            capacity,
            release,
            acquire,
        }
    }

    /// Number of slots the gate was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.acquire.len()
    }

    /// Take a slot, blocking until one is free.
    pub fn acquire(&self) -> Permit<'_> {
        // Both ends of the channel live as long as the gate, so this can
        // only return once a token arrives.
        let _ = self.acquire.recv();
        Permit { gate: self }
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        self.acquire.try_recv().ok().map(|_| Permit { gate: self })
    }
}

impl<'a> Drop for Permit<'a> {
    fn drop(&mut self) {
        let _ = self.gate.release.try_send(());
    }
}
