use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Reference-counted loading flag: loading while at least one holder is active.
#[derive(Clone, Debug, Default)]
pub struct LoadingGate {
    pending: Arc<AtomicUsize>,
}

impl LoadingGate {
    pub fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Never drops below zero.
    pub fn decrement(&self) {
        // Err means already zero.
        self.pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            })
            .ok();
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.pending() > 0
    }

    /// Increments now and decrements when the returned guard drops.
    pub fn enter(&self) -> LoadingGuard {
        self.increment();
        LoadingGuard { gate: self.clone() }
    }
}

pub struct LoadingGuard {
    gate: LoadingGate,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.gate.decrement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_floors_at_zero() {
        let gate = LoadingGate::default();
        gate.decrement();
        assert_eq!(gate.pending(), 0);
        assert!(!gate.is_loading());

        gate.increment();
        gate.increment();
        gate.decrement();
        assert!(gate.is_loading());
        gate.decrement();
        gate.decrement();
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn guard_releases_on_drop() {
        let gate = LoadingGate::default();
        {
            let _first = gate.enter();
            let _second = gate.enter();
            assert_eq!(gate.pending(), 2);
        }
        assert!(!gate.is_loading());
    }
}
