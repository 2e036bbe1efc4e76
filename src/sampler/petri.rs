use super::Sampler;
use crate::distribution::dist::Dist;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::Rng;
use rand::RngCore;
use std::collections::BTreeMap;

/// uniform choice among the enabled set at the current instant.
///
/// ignores every distribution it is handed; exists to drive petri-net
/// style tests where only the choice of transition matters, not the
/// waiting time.
#[derive(Debug, Clone)]
pub struct Petri<K: ClockKey> {
    order: Vec<K>,
    index: BTreeMap<K, usize>,
    cache: Option<(Time, Option<K>)>,
}

impl<K: ClockKey> Default for Petri<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> Petri<K> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            index: BTreeMap::new(),
            cache: None,
        }
    }
}

impl<K: ClockKey> Sampler<K> for Petri<K> {
    fn enable(
        &mut self,
        clock: K,
        _dist: &Dist,
        _te: Time,
        _when: Time,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        if !self.index.contains_key(&clock) {
            self.index.insert(clock.clone(), self.order.len());
            self.order.push(clock);
        }
        self.cache = None;
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        let position = self.index.remove(clock).ok_or_else(|| Error::unknown(clock))?;
        self.order.swap_remove(position);
        if let Some(moved) = self.order.get(position) {
            self.index.insert(moved.clone(), position);
        }
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let winner = if self.order.is_empty() {
                (f64::INFINITY, None)
            } else {
                let pick = rng.random_range(0..self.order.len());
                (when, Some(self.order[pick].clone()))
            };
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        self.order.clear();
        self.index.clear();
        self.cache = None;
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.index.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.index.keys().cloned().collect()
    }
}
