use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::univariate::Univariate;
use crate::queue::heap::FiringQueue;
use crate::queue::heap::Handle;
use crate::queue::sample::OrderedSample;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::RngCore;
use std::collections::BTreeMap;

/// draw once per enabling, keep the earliest.
///
/// the fastest engine when each clock fires at most once with a fixed
/// distribution. it keeps no residual-survival state, so disabling a
/// non-exponential clock and enabling it again re-draws from scratch
/// and biases the master equation; callers who need conditional
/// survival preserved belong on the next-reaction family.
#[derive(Debug, Clone, Default)]
pub struct FirstToFire<K: ClockKey> {
    queue: FiringQueue<K>,
    handles: BTreeMap<K, Handle>,
    entries: BTreeMap<K, (Dist, Time)>,
}

impl<K: ClockKey> FirstToFire<K> {
    pub fn new() -> Self {
        Self {
            queue: FiringQueue::new(),
            handles: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

impl<K: ClockKey> Sampler<K> for FirstToFire<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        te: Time,
        when: Time,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let cut = (when - te).max(0.0);
        let tau = te + dist.sample_trunc(cut, rng);
        match self.handles.get(&clock) {
            Some(&handle) => self.queue.update(handle, tau),
            None => {
                let handle = self.queue.push(OrderedSample::new(clock.clone(), tau));
                self.handles.insert(clock.clone(), handle);
            }
        }
        self.entries.insert(clock, (dist.clone(), te));
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        let handle = self.handles.remove(clock).ok_or_else(|| Error::unknown(clock))?;
        self.queue.remove(handle);
        self.entries.remove(clock);
        Ok(())
    }

    fn next(&mut self, when: Time, _rng: &mut dyn RngCore) -> (Time, Option<K>) {
        match self.queue.peek() {
            Some(top) => (top.time.max(when), Some(top.key.clone())),
            None => (f64::INFINITY, None),
        }
    }

    fn jitter(&mut self, when: Time, rng: &mut dyn RngCore) {
        for (clock, (dist, te)) in self.entries.iter() {
            let cut = (when - te).max(0.0);
            let tau = te + dist.sample_trunc(cut, rng);
            self.queue.update(self.handles[clock], tau);
        }
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.handles.clear();
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.handles.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.handles.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.handles.keys().cloned().collect()
    }
}
