// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event streams.
//!
//! An [`Emitter`] owns a list of listeners and fires events to them
//! synchronously. Consumers get an [`Event`] handle to subscribe with and
//! receive a [`Subscription`] that releases the listener when disposed or
//! dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    entries: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
    disposed: AtomicBool,
}

impl<T> Listeners<T> {
    fn remove(&self, id: u64) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }
}

/// Owning side of an event stream.
///
/// Cloning an emitter yields another handle to the same listener list.
pub struct Emitter<T> {
    listeners: Arc<Listeners<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Listeners {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribable handle for consumers.
    pub fn event(&self) -> Event<T> {
        Event {
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn fire(&self, event: &T) {
        if self.is_disposed() {
            return;
        }
        // Listeners may subscribe or unsubscribe while being called.
        let snapshot: Vec<Listener<T>> = match self.listeners.entries.lock() {
            Ok(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }

    /// Drop all listeners. Later `fire` and `subscribe` calls do nothing.
    pub fn dispose(&self) {
        if self.listeners.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut entries) = self.listeners.entries.lock() {
            entries.clear();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.listeners.disposed.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

/// Subscribing side of an event stream.
///
/// Holds only a weak reference: once every [`Emitter`] handle is gone,
/// subscribing yields an inert subscription.
pub struct Event<T> {
    listeners: Weak<Listeners<T>>,
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Weak::clone(&self.listeners),
        }
    }
}

impl<T: 'static> Event<T> {
    /// An event that never fires.
    pub fn never() -> Self {
        Self {
            listeners: Weak::new(),
        }
    }

    /// Register `callback` and return the registration.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let Some(listeners) = self.listeners.upgrade() else {
            return Subscription::empty();
        };
        if listeners.disposed.load(Ordering::SeqCst) {
            return Subscription::empty();
        }

        let id = listeners.next_id.fetch_add(1, Ordering::SeqCst);
        match listeners.entries.lock() {
            Ok(mut entries) => entries.push((id, Arc::new(callback))),
            Err(_) => return Subscription::empty(),
        }

        let weak = Arc::downgrade(&listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.remove(id);
            }
        })
    }
}

type Release = Box<dyn FnOnce() + Send>;

/// A disposable registration.
///
/// The release routine runs at most once: on the first `dispose()` or when
/// the subscription is dropped, whichever comes first.
pub struct Subscription {
    release: Mutex<Option<Release>>,
}

impl Subscription {
    /// Wrap a release routine.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self {
            release: Mutex::new(None),
        }
    }

    pub fn dispose(&self) {
        let release = match self.release.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(release) = release {
            release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.release
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
