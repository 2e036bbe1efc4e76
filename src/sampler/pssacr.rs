use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::univariate::Univariate;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::Rng;
use rand::RngCore;
use rand_distr::Distribution;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

/// how clocks land in groups: hashed by key, or by a host-supplied map
#[derive(Clone)]
pub enum Assignment<K> {
    Hashed,
    Custom(Arc<dyn Fn(&K) -> usize + Send + Sync>),
}

impl<K> std::fmt::Debug for Assignment<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Hashed => write!(f, "Hashed"),
            Self::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// one group's clocks, kept dense by swap-removal.
/// the sum updates incrementally; the max is recomputed lazily when a
/// decrease or removal could have invalidated it.
#[derive(Debug, Clone)]
struct Group<K> {
    keys: Vec<K>,
    rates: Vec<f64>,
    sum: f64,
    max: f64,
}

impl<K> Default for Group<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            rates: Vec::new(),
            sum: 0.0,
            max: 0.0,
        }
    }
}

impl<K: ClockKey> Group<K> {
    fn refresh_max(&mut self) {
        self.max = self.rates.iter().copied().fold(0.0, f64::max);
    }

    fn set(&mut self, slot: usize, rate: f64) {
        let old = self.rates[slot];
        self.rates[slot] = rate;
        self.sum += rate - old;
        if rate >= self.max {
            self.max = rate;
        } else if old == self.max {
            self.refresh_max();
        }
    }

    fn push(&mut self, clock: K, rate: f64) -> usize {
        self.keys.push(clock);
        self.rates.push(rate);
        self.sum += rate;
        self.max = self.max.max(rate);
        self.keys.len() - 1
    }

    fn swap_remove(&mut self, slot: usize) -> Option<&K> {
        let rate = self.rates.swap_remove(slot);
        self.keys.swap_remove(slot);
        self.sum -= rate;
        if rate == self.max {
            self.refresh_max();
        }
        self.keys.get(slot)
    }
}

/// composition-rejection over a fixed partition of clocks.
///
/// a step composes: exponential wait at the grand total, a group
/// drawn by its share of that total, then uniform candidates inside
/// the group accepted against the group max. group sums and maxima
/// are the only aggregates maintained, which keeps enable and disable
/// cheap for very large exponential populations.
#[derive(Debug, Clone)]
pub struct Pssacr<K: ClockKey> {
    groups: Vec<Group<K>>,
    places: BTreeMap<K, (usize, usize)>,
    assign: Assignment<K>,
    cache: Option<(Time, Option<K>)>,
}

impl<K: ClockKey> Pssacr<K> {
    pub fn new(groups: usize) -> Result<Self> {
        if groups == 0 {
            Err(Error::NoGroups)
        } else {
            Ok(Self {
                groups: vec![Group::default(); groups],
                places: BTreeMap::new(),
                assign: Assignment::Hashed,
                cache: None,
            })
        }
    }

    pub fn with_assignment(
        groups: usize,
        assign: Arc<dyn Fn(&K) -> usize + Send + Sync>,
    ) -> Result<Self> {
        let mut sampler = Self::new(groups)?;
        sampler.assign = Assignment::Custom(assign);
        Ok(sampler)
    }

    fn group_of(&self, clock: &K) -> usize {
        match &self.assign {
            Assignment::Hashed => {
                let mut hasher = DefaultHasher::new();
                clock.hash(&mut hasher);
                (hasher.finish() % self.groups.len() as u64) as usize
            }
            Assignment::Custom(assign) => assign(clock) % self.groups.len(),
        }
    }
}

impl<K: ClockKey> Default for Pssacr<K> {
    fn default() -> Self {
        Self::new(crate::PSSACR_GROUPS).expect("default group count is nonzero")
    }
}

impl<K: ClockKey> Sampler<K> for Pssacr<K> {
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
            sampler: "pssacr",
        })?;
        match self.places.get(&clock) {
            Some(&(home, slot)) => self.groups[home].set(slot, rate),
            None => {
                let home = self.group_of(&clock);
                let slot = self.groups[home].push(clock.clone(), rate);
                self.places.insert(clock, (home, slot));
            }
        }
        self.cache = None;
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        let (home, slot) = self
            .places
            .remove(clock)
            .ok_or_else(|| Error::unknown(clock))?;
        if let Some(moved) = self.groups[home].swap_remove(slot) {
            self.places.insert(moved.clone(), (home, slot));
        }
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let total: f64 = self.groups.iter().map(|group| group.sum).sum();
            let winner = if total <= 0.0 {
                (f64::INFINITY, None)
            } else {
                let delta = rand_distr::Exp::new(total)
                    .expect("positive total rate")
                    .sample(rng);
                let mut target = rng.random::<f64>() * total;
                let home = self
                    .groups
                    .iter()
                    .position(|group| {
                        if target < group.sum && group.max > 0.0 {
                            true
                        } else {
                            target -= group.sum;
                            false
                        }
                    })
                    .unwrap_or_else(|| {
                        self.groups
                            .iter()
                            .rposition(|group| group.max > 0.0)
                            .expect("positive total implies a live group")
                    });
                let group = &self.groups[home];
                let slot = loop {
                    let slot = rng.random_range(0..group.keys.len());
                    if rng.random::<f64>() * group.max < group.rates[slot] {
                        break slot;
                    }
                    log::trace!("pssacr rejected slot {} in group {}", slot, home);
                };
                (when + delta, Some(group.keys[slot].clone()))
            };
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        let count = self.groups.len();
        self.groups = vec![Group::default(); count];
        self.places.clear();
        self.cache = None;
    }

    fn len(&self) -> usize {
        self.places.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.places.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.places.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn rng(seed: u64) -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(seed)
    }

    #[test]
    fn zero_groups_is_a_domain_error() {
        assert!(matches!(Pssacr::<u32>::new(0), Err(Error::NoGroups)));
    }

    #[test]
    fn aggregates_track_mutations() {
        let mut rng = rng(1);
        let mut sampler = Pssacr::with_assignment(4, Arc::new(|clock: &u32| *clock as usize))
            .unwrap();
        sampler.enable(0, &Dist::exponential(1.0).unwrap(), 0.0, 0.0, &mut rng).unwrap();
        sampler.enable(4, &Dist::exponential(3.0).unwrap(), 0.0, 0.0, &mut rng).unwrap();
        sampler.enable(8, &Dist::exponential(5.0).unwrap(), 0.0, 0.0, &mut rng).unwrap();
        let group = &sampler.groups[0];
        assert!(group.sum == 9.0);
        assert!(group.max == 5.0);
        sampler.disable(&8, 0.0).unwrap();
        let group = &sampler.groups[0];
        assert!(group.sum == 4.0);
        assert!(group.max == 3.0);
        sampler.enable(4, &Dist::exponential(0.5).unwrap(), 0.0, 0.0, &mut rng).unwrap();
        let group = &sampler.groups[0];
        assert!(group.sum == 1.5);
        assert!(group.max == 1.0);
    }

    #[test]
    fn swap_removal_keeps_places_honest() {
        let mut rng = rng(2);
        let mut sampler = Pssacr::with_assignment(1, Arc::new(|_: &u32| 0)).unwrap();
        for clock in 0..6 {
            sampler
                .enable(
                    clock,
                    &Dist::exponential(1.0 + clock as f64).unwrap(),
                    0.0,
                    0.0,
                    &mut rng,
                )
                .unwrap();
        }
        sampler.disable(&0, 0.0).unwrap();
        sampler.disable(&3, 0.0).unwrap();
        for clock in [1u32, 2, 4, 5] {
            assert!(sampler.contains(&clock));
            sampler
                .enable(clock, &Dist::exponential(9.0).unwrap(), 0.0, 0.0, &mut rng)
                .unwrap();
        }
        assert!(sampler.groups[0].sum == 36.0);
        assert!(sampler.len() == 4);
    }

    #[test]
    fn cached_event_is_idempotent() {
        let mut rng = rng(3);
        let mut sampler = Pssacr::default();
        for clock in 0..50 {
            sampler
                .enable(clock, &Dist::exponential(0.5).unwrap(), 0.0, 0.0, &mut rng)
                .unwrap();
        }
        let first = sampler.next(2.0, &mut rng);
        assert!(first == sampler.next(2.0, &mut rng));
        assert!(first.0 >= 2.0);
        sampler.disable(&7, 2.0).unwrap();
        assert!(sampler.next(2.0, &mut rng) != first);
    }

    #[test]
    fn drains_to_infinity() {
        let mut rng = rng(4);
        let mut sampler = Pssacr::default();
        for clock in 0..10 {
            sampler
                .enable(clock, &Dist::exponential(1.0).unwrap(), 0.0, 0.0, &mut rng)
                .unwrap();
        }
        for clock in 0..10 {
            sampler.disable(&clock, 0.0).unwrap();
        }
        assert!(sampler.next(0.0, &mut rng) == (f64::INFINITY, None));
        assert!(matches!(sampler.fire(&0, 0.0), Err(Error::UnknownClock(_))));
    }
}
