use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::univariate::Univariate;
use crate::queue::cumsum::CumulativeArray;
use crate::queue::PrefixSum;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::Rng;
use rand::RngCore;
use rand_distr::Distribution;
use std::collections::BTreeMap;

/// a slice of clocks whose rates share a power-of-two magnitude
#[derive(Debug, Clone)]
struct Band<K> {
    weights: CumulativeArray,
    keys: Vec<K>,
    slots: BTreeMap<K, usize>,
    free: Vec<usize>,
}

impl<K> Default for Band<K> {
    fn default() -> Self {
        Self {
            weights: CumulativeArray::new(),
            keys: Vec::new(),
            slots: BTreeMap::new(),
            free: Vec::new(),
        }
    }
}

impl<K: ClockKey> Band<K> {
    fn set(&mut self, clock: &K, rate: f64) {
        match self.slots.get(clock) {
            Some(&slot) => self.weights.set(slot, rate),
            None => {
                let slot = match self.free.pop() {
                    Some(slot) => {
                        self.weights.set(slot, rate);
                        self.keys[slot] = clock.clone();
                        slot
                    }
                    None => {
                        self.keys.push(clock.clone());
                        self.weights.push(rate)
                    }
                };
                self.slots.insert(clock.clone(), slot);
            }
        }
    }

    fn remove(&mut self, clock: &K) {
        if let Some(slot) = self.slots.remove(clock) {
            self.weights.set(slot, 0.0);
            self.free.push(slot);
        }
    }
}

/// direct method partitioned by rate magnitude.
///
/// summing rates that span many decades in one array loses the small
/// ones to roundoff; binning clocks by floor(log2 rate) keeps each
/// partial sum well conditioned. a step picks a band categorically by
/// its total, then a clock within the band by weight.
#[derive(Debug, Clone)]
pub struct MultipleDirect<K: ClockKey> {
    bands: BTreeMap<i32, Band<K>>,
    homes: BTreeMap<K, i32>,
    cache: Option<(Time, Option<K>)>,
}

fn band_of(rate: f64) -> i32 {
    rate.log2().floor() as i32
}

impl<K: ClockKey> Default for MultipleDirect<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> MultipleDirect<K> {
    pub fn new() -> Self {
        Self {
            bands: BTreeMap::new(),
            homes: BTreeMap::new(),
            cache: None,
        }
    }
}

impl<K: ClockKey> Sampler<K> for MultipleDirect<K> {
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
            sampler: "multiple direct",
        })?;
        let home = band_of(rate);
        if let Some(old) = self.homes.get(&clock) {
            if *old != home {
                self.bands.get_mut(old).expect("home bands exist").remove(&clock);
            }
        }
        self.bands.entry(home).or_default().set(&clock, rate);
        self.homes.insert(clock, home);
        self.cache = None;
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        let home = self.homes.remove(clock).ok_or_else(|| Error::unknown(clock))?;
        self.bands.get_mut(&home).expect("home bands exist").remove(clock);
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let totals = self
                .bands
                .iter_mut()
                .map(|(id, band)| (*id, band.weights.total()))
                .collect::<Vec<_>>();
            let total: f64 = totals.iter().map(|(_, t)| t).sum();
            let winner = if total <= 0.0 {
                (f64::INFINITY, None)
            } else {
                let delta = rand_distr::Exp::new(total)
                    .expect("positive total rate")
                    .sample(rng);
                // categorical over band totals, then weighted within
                let mut target = rng.random::<f64>() * total;
                let home = totals
                    .iter()
                    .find(|(_, t)| {
                        if target < *t {
                            true
                        } else {
                            target -= t;
                            false
                        }
                    })
                    .map(|(id, _)| *id)
                    .unwrap_or_else(|| {
                        totals
                            .iter()
                            .rev()
                            .find(|(_, t)| *t > 0.0)
                            .map(|(id, _)| *id)
                            .expect("positive total implies a live band")
                    });
                let band = self.bands.get_mut(&home).expect("chosen band exists");
                let slot = loop {
                    let draw = rng.random::<f64>() * band.weights.total();
                    let slot = band.weights.locate(draw);
                    if band.weights.weight(slot) > 0.0 {
                        break slot;
                    }
                };
                (when + delta, Some(band.keys[slot].clone()))
            };
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        self.bands.clear();
        self.homes.clear();
        self.cache = None;
    }

    fn len(&self) -> usize {
        self.homes.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.homes.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.homes.keys().cloned().collect()
    }
}
