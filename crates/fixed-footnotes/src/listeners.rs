//! Refresh listeners

use std::fmt;
use std::rc::Rc;

/// Callback run after a refresh has been painted
pub type RefreshListener = Rc<dyn Fn()>;

/// Ordered listener registry keyed by `Rc` identity
#[derive(Default)]
pub struct RefreshListeners {
    listeners: Vec<RefreshListener>,
}

impl RefreshListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; the same `Rc` may be registered more than once
    pub fn add(&mut self, listener: RefreshListener) {
        self.listeners.push(listener);
    }

    /// Remove the first registration of `listener`. Returns false when it
    /// was never registered.
    pub fn remove(&mut self, listener: &RefreshListener) -> bool {
        match self.listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current registrations, in order
    pub fn snapshot(&self) -> Vec<RefreshListener> {
        self.listeners.clone()
    }
}

impl fmt::Debug for RefreshListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_snapshot_preserves_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = RefreshListeners::new();
        for name in ["a", "b", "c"] {
            let log = log.clone();
            listeners.add(Rc::new(move || log.borrow_mut().push(name)));
        }

        for listener in listeners.snapshot() {
            listener();
        }
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut listeners = RefreshListeners::new();
        let a: RefreshListener = Rc::new(|| {});
        let b: RefreshListener = Rc::new(|| {});
        listeners.add(a.clone());
        listeners.add(b.clone());
        listeners.add(a.clone());

        assert!(listeners.remove(&a));
        assert_eq!(listeners.len(), 2);
        assert!(listeners.remove(&a));
        assert!(!listeners.remove(&a));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_remove_unknown() {
        let mut listeners = RefreshListeners::new();
        listeners.add(Rc::new(|| {}));
        let stranger: RefreshListener = Rc::new(|| {});

        assert!(!listeners.remove(&stranger));
        assert_eq!(listeners.len(), 1);
    }
}
