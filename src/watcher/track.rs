use crate::distribution::dist::Dist;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use std::collections::BTreeMap;

/// everything remembered about one enabling.
///
/// `te` is the absolute zero of the distribution; `when` the time the
/// clock was enabled. the vector carries every candidate law for
/// importance sampling; plain enables hold exactly one.
#[derive(Debug, Clone)]
pub struct EnablingEntry {
    pub dists: Vec<Dist>,
    pub te: Time,
    pub when: Time,
}

impl EnablingEntry {
    /// the law at a likelihood slot, falling back to the first when
    /// the enabling carried fewer candidates than the context tracks
    pub fn dist(&self, index: usize) -> &Dist {
        self.dists.get(index).unwrap_or(&self.dists[0])
    }
}

/// mirror of the enabled set, keyed by clock.
/// the likelihood watcher builds on this; hosts can also read it back
/// to introspect what is currently pending.
#[derive(Debug, Clone, Default)]
pub struct TrackWatcher<K: ClockKey> {
    entries: BTreeMap<K, EnablingEntry>,
}

impl<K: ClockKey> TrackWatcher<K> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn enable(&mut self, clock: K, dists: Vec<Dist>, te: Time, when: Time) {
        self.entries.insert(clock, EnablingEntry { dists, te, when });
    }

    pub fn disable(&mut self, clock: &K) -> Result<EnablingEntry> {
        self.entries.remove(clock).ok_or_else(|| Error::unknown(clock))
    }

    pub fn entry(&self, clock: &K) -> Option<&EnablingEntry> {
        self.entries.get(clock)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&K, &EnablingEntry)> {
        self.entries.iter()
    }

    pub fn contains(&self, clock: &K) -> bool {
        self.entries.contains_key(clock)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
