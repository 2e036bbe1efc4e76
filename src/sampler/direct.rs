use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::univariate::Univariate;
use crate::queue::fenwick::FenwickTree;
use crate::queue::PrefixSum;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::Rng;
use rand::RngCore;
use rand_distr::Distribution;
use std::collections::BTreeMap;

/// gillespie's direct method over a fenwick tree of propensities.
///
/// exponential clocks only: the wait is Exp(Σλ) and the firing clock
/// is categorical in the rates. memorylessness is what lets every
/// step redraw from scratch, so disables and updates are just weight
/// writes. the single upcoming event is cached until any mutation.
#[derive(Debug, Clone)]
pub struct MarkovDirect<K: ClockKey> {
    tree: FenwickTree,
    keys: Vec<K>,
    index: BTreeMap<K, usize>,
    free: Vec<usize>,
    cache: Option<(Time, Option<K>)>,
}

impl<K: ClockKey> Default for MarkovDirect<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> MarkovDirect<K> {
    pub fn new() -> Self {
        Self {
            tree: FenwickTree::new(),
            keys: Vec::new(),
            index: BTreeMap::new(),
            free: Vec::new(),
            cache: None,
        }
    }
}

impl<K: ClockKey> Sampler<K> for MarkovDirect<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        _te: Time,
        _when: Time,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        let rate = dist.rate().ok_or(Error::NotExponential {
            kind: dist.kind(),
            sampler: "direct",
        })?;
        match self.index.get(&clock) {
            Some(&slot) => self.tree.set(slot, rate),
            None => {
                let slot = match self.free.pop() {
                    Some(slot) => {
                        self.tree.set(slot, rate);
                        self.keys[slot] = clock.clone();
                        slot
                    }
                    None => {
                        self.keys.push(clock.clone());
                        self.tree.push(rate)
                    }
                };
                self.index.insert(clock, slot);
            }
        }
        self.cache = None;
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        let slot = self.index.remove(clock).ok_or_else(|| Error::unknown(clock))?;
        self.tree.set(slot, 0.0);
        self.free.push(slot);
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let total = self.tree.total();
            let winner = if total <= 0.0 {
                (f64::INFINITY, None)
            } else {
                let delta = rand_distr::Exp::new(total)
                    .expect("positive total rate")
                    .sample(rng);
                let slot = loop {
                    let slot = self.tree.locate(rng.random::<f64>() * total);
                    if self.tree.weight(slot) > 0.0 {
                        break slot;
                    }
                };
                (when + delta, Some(self.keys[slot].clone()))
            };
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        self.tree.clear();
        self.keys.clear();
        self.index.clear();
        self.free.clear();
        self.cache = None;
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.index.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.index.keys().cloned().collect()
    }
}
