//! Scoped event subscriptions.
//!
//! A listener stays registered exactly as long as its [`Subscription`] is
//! alive. Dropping the handle releases it, so callers never have to pair
//! manual add/remove calls.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<E> = Box<dyn FnMut(&E)>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
    emitting: bool,
    released: Vec<u64>,
}

pub struct Listeners<E> {
    inner: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
                emitting: false,
                released: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Box::new(callback)));
            id
        };
        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.borrow_mut();
                    let before = registry.entries.len();
                    registry.entries.retain(|(entry, _)| *entry != id);
                    if registry.entries.len() == before && registry.emitting {
                        registry.released.push(id);
                    }
                }
            })),
        }
    }

    /// Calls every registered listener once. Listeners may subscribe or
    /// release other subscriptions while being called.
    pub fn emit(&self, event: &E) {
        let mut entries = {
            let mut registry = self.inner.borrow_mut();
            registry.emitting = true;
            std::mem::take(&mut registry.entries)
        };
        for (_, callback) in entries.iter_mut() {
            callback(event);
        }
        let mut registry = self.inner.borrow_mut();
        let released = std::mem::take(&mut registry.released);
        entries.retain(|(id, _)| !released.contains(id));
        entries.append(&mut registry.entries);
        registry.entries = entries;
        registry.emitting = false;
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn drop_releases_listener() {
        let listeners = Listeners::<u32>::new();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let subscription = listeners.subscribe(move |value| counter.set(counter.get() + value));

        listeners.emit(&2);
        assert_eq!(seen.get(), 2);
        assert_eq!(listeners.len(), 1);

        drop(subscription);
        listeners.emit(&5);
        assert_eq!(seen.get(), 2);
        assert!(listeners.is_empty());
    }

    #[test]
    fn release_during_emit_is_honoured() {
        let listeners = Listeners::<()>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let inner_slot = slot.clone();
        let inner_calls = calls.clone();
        let subscription = listeners.subscribe(move |_| {
            inner_calls.set(inner_calls.get() + 1);
            inner_slot.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(subscription);

        listeners.emit(&());
        listeners.emit(&());
        assert_eq!(calls.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn subscription_outlives_registry() {
        let listeners = Listeners::<()>::new();
        let subscription = listeners.subscribe(|_| {});
        drop(listeners);
        drop(subscription);
    }
}
