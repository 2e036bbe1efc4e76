use crate::ClockKey;
use crate::Time;

/// append-only record of every mutation a context forwarded.
/// nothing is ever compacted; this exists to be dumped when a
/// trajectory needs explaining.
#[derive(Debug, Clone, Default)]
pub struct DebugWatcher<K: ClockKey> {
    pub enables: Vec<(K, Time)>,
    pub disables: Vec<(K, Time)>,
    pub fires: Vec<(K, Time)>,
}

impl<K: ClockKey> DebugWatcher<K> {
    pub fn new() -> Self {
        Self {
            enables: Vec::new(),
            disables: Vec::new(),
            fires: Vec::new(),
        }
    }

    pub fn enable(&mut self, clock: K, when: Time) {
        self.enables.push((clock, when));
    }

    pub fn disable(&mut self, clock: K, when: Time) {
        self.disables.push((clock, when));
    }

    pub fn fire(&mut self, clock: K, when: Time) {
        self.fires.push((clock, when));
    }

    pub fn reset(&mut self) {
        self.enables.clear();
        self.disables.clear();
        self.fires.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_are_append_only() {
        let mut watcher = DebugWatcher::new();
        watcher.enable('a', 0.0);
        watcher.enable('b', 0.0);
        watcher.fire('a', 1.5);
        watcher.enable('a', 1.5);
        watcher.disable('b', 2.0);
        assert!(watcher.enables == vec![('a', 0.0), ('b', 0.0), ('a', 1.5)]);
        assert!(watcher.disables == vec![('b', 2.0)]);
        assert!(watcher.fires == vec![('a', 1.5)]);
        watcher.reset();
        assert!(watcher.enables.is_empty());
    }
}
