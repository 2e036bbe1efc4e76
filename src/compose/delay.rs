use crate::distribution::dist::Dist;
use crate::ClockKey;
use std::collections::BTreeMap;

/// which leg of a delayed reaction an internal clock represents.
/// plain contexts only ever use Regular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Regular,
    Initiate,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Initiate => write!(f, "initiate"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// a user clock widened with its phase; the key type samplers see
/// inside a context
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockPhase<K> {
    pub key: K,
    pub phase: Phase,
}

impl<K> ClockPhase<K> {
    pub fn regular(key: K) -> Self {
        Self {
            key,
            phase: Phase::Regular,
        }
    }

    pub fn initiate(key: K) -> Self {
        Self {
            key,
            phase: Phase::Initiate,
        }
    }

    pub fn complete(key: K) -> Self {
        Self {
            key,
            phase: Phase::Complete,
        }
    }
}

impl<K: std::fmt::Display> std::fmt::Display for ClockPhase<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.phase {
            Phase::Regular => write!(f, "{}", self.key),
            _ => write!(f, "{}:{}", self.key, self.phase),
        }
    }
}

/// a reaction that occupies a window of time: the initiation law
/// starts the window and the duration law closes it
#[derive(Debug, Clone)]
pub struct Delayed {
    pub initiation: Dist,
    pub duration: Dist,
}

impl Delayed {
    pub fn new(initiation: Dist, duration: Dist) -> Self {
        Self {
            initiation,
            duration,
        }
    }
}

/// duration laws parked between a delayed clock's initiation and its
/// completion
#[derive(Debug, Clone, Default)]
pub struct DelayedState<K: ClockKey> {
    durations: BTreeMap<K, Dist>,
}

impl<K: ClockKey> DelayedState<K> {
    pub fn new() -> Self {
        Self {
            durations: BTreeMap::new(),
        }
    }

    pub fn store(&mut self, clock: K, duration: Dist) {
        self.durations.insert(clock, duration);
    }

    pub fn duration(&self, clock: &K) -> Option<&Dist> {
        self.durations.get(clock)
    }

    pub fn take(&mut self, clock: &K) -> Option<Dist> {
        self.durations.remove(clock)
    }

    pub fn reset(&mut self) {
        self.durations.clear();
    }
}
