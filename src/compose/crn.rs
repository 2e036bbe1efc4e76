use crate::distribution::dist::Dist;
use crate::sampler::AnySampler;
use crate::sampler::Sampler;
use crate::ClockKey;
use crate::Result;
use crate::Time;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrnMode {
    Record,
    Replay,
}

/// common random numbers across simulation runs.
///
/// in record mode, the generator state is snapshotted before every
/// enable and kept when the call actually consumed randomness, which
/// cloned-state equality detects. in replay mode each enable runs
/// against a copy of its recorded state, leaving the base generator
/// untouched; clocks with nothing recorded fall back to the base
/// generator and count as misses. per-clock cursors make repeated
/// enables of one clock replay in order.
#[derive(Debug, Clone)]
pub struct CommonRandom<K: ClockKey, R> {
    mode: CrnMode,
    saved: BTreeMap<K, Vec<R>>,
    cursor: BTreeMap<K, usize>,
    misses: usize,
}

impl<K: ClockKey, R: Rng + Clone + PartialEq> CommonRandom<K, R> {
    pub fn new() -> Self {
        Self {
            mode: CrnMode::Record,
            saved: BTreeMap::new(),
            cursor: BTreeMap::new(),
            misses: 0,
        }
    }

    pub fn mode(&self) -> CrnMode {
        self.mode
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn enable(
        &mut self,
        sampler: &mut AnySampler<K>,
        clock: K,
        dist: &Dist,
        te: Time,
        when: Time,
        rng: &mut R,
    ) -> Result<()> {
        match self.mode {
            CrnMode::Record => {
                if !self.saved.contains_key(&clock) {
                    self.misses += 1;
                }
                let before = rng.clone();
                sampler.enable(clock.clone(), dist, te, when, rng)?;
                if *rng != before {
                    self.saved.entry(clock).or_default().push(before);
                }
                Ok(())
            }
            CrnMode::Replay => {
                let seen = self.cursor.get(&clock).copied().unwrap_or(0);
                match self.saved.get(&clock).and_then(|states| states.get(seen)) {
                    Some(state) => {
                        let mut replay = state.clone();
                        self.cursor.insert(clock.clone(), seen + 1);
                        sampler.enable(clock, dist, te, when, &mut replay)
                    }
                    None => {
                        self.misses += 1;
                        log::debug!("crn replay miss for {:?}", clock);
                        sampler.enable(clock, dist, te, when, rng)
                    }
                }
            }
        }
    }

    /// stop recording and replay from the top on the next run
    pub fn freeze(&mut self) {
        self.mode = CrnMode::Replay;
        self.rewind();
    }

    /// restart cursors and the miss count, keeping recordings
    pub fn rewind(&mut self) {
        self.cursor.clear();
        self.misses = 0;
    }

    /// drop every recording and go back to recording fresh
    pub fn reset(&mut self) {
        self.mode = CrnMode::Record;
        self.saved.clear();
        self.cursor.clear();
        self.misses = 0;
    }
}

impl<K: ClockKey, R: Rng + Clone + PartialEq> Default for CommonRandom<K, R> {
    fn default() -> Self {
        Self::new()
    }
}
