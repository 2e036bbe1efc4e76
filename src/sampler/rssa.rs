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

/// rejection sampling over upper-bound propensities.
///
/// the fenwick tree holds a bound at least the true rate for every
/// enabled clock, so most rate updates touch only the flat rate array
/// and leave the tree alone. a step thins a Poisson stream at the
/// bound total, accepting each candidate with true over bound.
/// exactness follows from thinning; the bound factor trades tree
/// updates against rejections.
#[derive(Debug, Clone)]
pub struct Rssa<K: ClockKey> {
    bounds: FenwickTree,
    rates: Vec<f64>,
    keys: Vec<K>,
    index: BTreeMap<K, usize>,
    free: Vec<usize>,
    factor: f64,
    cache: Option<(Time, Option<K>)>,
}

impl<K: ClockKey> Rssa<K> {
    pub fn new(factor: f64) -> Result<Self> {
        if factor >= 1.0 {
            Ok(Self {
                bounds: FenwickTree::new(),
                rates: Vec::new(),
                keys: Vec::new(),
                index: BTreeMap::new(),
                free: Vec::new(),
                factor,
                cache: None,
            })
        } else {
            // covers negative, sub-one, and NaN factors alike
            Err(Error::BoundFactor(factor))
        }
    }
}

impl<K: ClockKey> Default for Rssa<K> {
    fn default() -> Self {
        Self::new(crate::RSSA_BOUND_FACTOR).expect("default factor exceeds one")
    }
}

impl<K: ClockKey> Sampler<K> for Rssa<K> {
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
            sampler: "rssa",
        })?;
        match self.index.get(&clock) {
            Some(&slot) => {
                self.rates[slot] = rate;
                let bound = self.bounds.weight(slot);
                // re-widen when the bound is breached, re-tighten when
                // the rate has fallen far enough below it
                if rate > bound || rate * self.factor * self.factor < bound {
                    log::debug!("rssa bound for slot {} moves to {:e}", slot, rate * self.factor);
                    self.bounds.set(slot, rate * self.factor);
                }
            }
            None => {
                let slot = match self.free.pop() {
                    Some(slot) => {
                        self.rates[slot] = rate;
                        self.keys[slot] = clock.clone();
                        self.bounds.set(slot, rate * self.factor);
                        slot
                    }
                    None => {
                        self.rates.push(rate);
                        self.keys.push(clock.clone());
                        self.bounds.push(rate * self.factor)
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
        self.rates[slot] = 0.0;
        self.bounds.set(slot, 0.0);
        self.free.push(slot);
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let mut now = when;
            let winner = loop {
                let total = self.bounds.total();
                if total <= 0.0 {
                    break (f64::INFINITY, None);
                }
                now += rand_distr::Exp::new(total)
                    .expect("positive bound total")
                    .sample(rng);
                let slot = loop {
                    let slot = self.bounds.locate(rng.random::<f64>() * total);
                    if self.bounds.weight(slot) > 0.0 {
                        break slot;
                    }
                };
                if rng.random::<f64>() * self.bounds.weight(slot) < self.rates[slot] {
                    break (now, Some(self.keys[slot].clone()));
                }
                log::trace!("rssa thinning rejected slot {}", slot);
            };
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        self.bounds.clear();
        self.rates.clear();
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
