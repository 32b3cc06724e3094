//! Minimal observer lists used to tell the UI that the scene changed

use std::fmt;

/// Handle returned by [`Observable::add`], used to remove the observer again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// A list of callbacks notified with a value of type `T`
pub struct Observable<T> {
    observers: Vec<(ObserverHandle, Callback<T>)>,
    next_handle: u64,
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
            next_handle: 0,
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<T> Observable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnMut(&T) + Send + 'static) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle);
        self.next_handle += 1;
        self.observers.push((handle, Box::new(callback)));
        handle
    }

    /// Returns `false` when the handle was not registered
    pub fn remove(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    /// Call every observer in registration order
    pub fn notify(&mut self, value: &T) {
        for (_, callback) in &mut self.observers {
            callback(value);
        }
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_notify_and_remove() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut observable = Observable::<u32>::new();

        let counter = calls.clone();
        let handle = observable.add(move |value| {
            counter.fetch_add(*value as usize, Ordering::SeqCst);
        });
        assert!(observable.has_observers());

        observable.notify(&2);
        observable.notify(&3);
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        assert!(observable.remove(handle));
        assert!(!observable.remove(handle));
        observable.notify(&10);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
