use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::univariate::Univariate;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::RngCore;
use std::collections::BTreeMap;

/// re-draw every enabled clock on every step and keep the minimum.
///
/// correct for every distribution and O(N) per step, so it earns its
/// keep as a reference oracle and for small enabled sets. putative
/// times honor the distribution zero: a clock whose te lies in the
/// past draws from the law left-truncated at `when - te`.
#[derive(Debug, Clone, Default)]
pub struct FirstReaction<K: ClockKey> {
    entries: BTreeMap<K, (Dist, Time)>,
    cache: Option<(Time, Option<K>)>,
}

impl<K: ClockKey> FirstReaction<K> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            cache: None,
        }
    }

    fn putative(dist: &Dist, te: Time, when: Time, rng: &mut dyn RngCore) -> Time {
        if te < when {
            te + dist.sample_trunc(when - te, rng)
        } else {
            te + dist.sample(rng)
        }
    }
}

impl<K: ClockKey> Sampler<K> for FirstReaction<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        te: Time,
        _when: Time,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.entries.insert(clock, (dist.clone(), te));
        self.cache = None;
        Ok(())
    }

    fn disable(&mut self, clock: &K, _when: Time) -> Result<()> {
        self.entries.remove(clock).ok_or_else(|| Error::unknown(clock))?;
        self.cache = None;
        Ok(())
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        if self.cache.is_none() {
            let winner = self
                .entries
                .iter()
                .map(|(clock, (dist, te))| (Self::putative(dist, *te, when, rng), clock))
                .min_by(|(a, _), (b, _)| a.total_cmp(b))
                .map(|(tau, clock)| (tau.max(when), Some(clock.clone())))
                .unwrap_or((f64::INFINITY, None));
            self.cache = Some(winner);
        }
        self.cache.clone().expect("just filled")
    }

    fn jitter(&mut self, _when: Time, _rng: &mut dyn RngCore) {
        self.cache = None;
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.cache = None;
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.entries.contains_key(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }
}
