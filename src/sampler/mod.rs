use crate::compose::multi::MultiSampler;
use crate::distribution::dist::Dist;
use crate::ClockKey;
use crate::Result;
use crate::Time;
use rand::RngCore;

pub mod direct;
pub mod firstreaction;
pub mod firsttofire;
pub mod multidirect;
pub mod petri;
pub mod pssacr;
pub mod reaction;
pub mod rssa;

/// the contract every sampling engine satisfies.
///
/// a host enables and disables clocks against the engine; the engine
/// answers which enabled clock fires next and when. `next` must be
/// idempotent between state-mutating calls, and an empty engine
/// answers (infinity, none).
pub trait Sampler<K: ClockKey> {
    /// register or refresh a clock. `te` is the absolute zero of the
    /// distribution, `when` the current simulation time.
    fn enable(&mut self, clock: K, dist: &Dist, te: Time, when: Time, rng: &mut dyn RngCore)
        -> Result<()>;

    /// withdraw a clock without firing it. unknown clocks are an error.
    fn disable(&mut self, clock: &K, when: Time) -> Result<()>;

    /// consume the clock that `next` reported
    fn fire(&mut self, clock: &K, when: Time) -> Result<()> {
        self.disable(clock, when)
    }

    /// the next (time, clock) to fire, or (infinity, none) when empty
    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>);

    /// redraw every pending firing so copied engines decorrelate
    fn jitter(&mut self, when: Time, rng: &mut dyn RngCore);

    fn reset(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, clock: &K) -> bool;

    fn keys(&self) -> Vec<K>;
}

/// tagged sum over the concrete engines, so contexts hold one field
/// and middleware stays monomorphic.
#[derive(Debug, Clone)]
pub enum AnySampler<K: ClockKey> {
    FirstToFire(firsttofire::FirstToFire<K>),
    FirstReaction(firstreaction::FirstReaction<K>),
    Petri(petri::Petri<K>),
    NextReaction(reaction::CombinedNextReaction<K>),
    Direct(direct::MarkovDirect<K>),
    MultipleDirect(multidirect::MultipleDirect<K>),
    Rssa(rssa::Rssa<K>),
    Pssacr(pssacr::Pssacr<K>),
    Multi(Box<MultiSampler<K>>),
}

impl<K: ClockKey> AnySampler<K> {
    fn inner(&self) -> &dyn Sampler<K> {
        match self {
            Self::FirstToFire(s) => s,
            Self::FirstReaction(s) => s,
            Self::Petri(s) => s,
            Self::NextReaction(s) => s,
            Self::Direct(s) => s,
            Self::MultipleDirect(s) => s,
            Self::Rssa(s) => s,
            Self::Pssacr(s) => s,
            Self::Multi(s) => s.as_ref(),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sampler<K> {
        match self {
            Self::FirstToFire(s) => s,
            Self::FirstReaction(s) => s,
            Self::Petri(s) => s,
            Self::NextReaction(s) => s,
            Self::Direct(s) => s,
            Self::MultipleDirect(s) => s,
            Self::Rssa(s) => s,
            Self::Pssacr(s) => s,
            Self::Multi(s) => s.as_mut(),
        }
    }
}

impl<K: ClockKey> Sampler<K> for AnySampler<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        te: Time,
        when: Time,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.inner_mut().enable(clock, dist, te, when, rng)
    }

    fn disable(&mut self, clock: &K, when: Time) -> Result<()> {
        self.inner_mut().disable(clock, when)
    }

    fn fire(&mut self, clock: &K, when: Time) -> Result<()> {
        self.inner_mut().fire(clock, when)
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        self.inner_mut().next(when, rng)
    }

    fn jitter(&mut self, when: Time, rng: &mut dyn RngCore) {
        self.inner_mut().jitter(when, rng)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.inner().contains(clock)
    }

    fn keys(&self) -> Vec<K> {
        self.inner().keys()
    }
}

impl<K: ClockKey> From<firsttofire::FirstToFire<K>> for AnySampler<K> {
    fn from(sampler: firsttofire::FirstToFire<K>) -> Self {
        Self::FirstToFire(sampler)
    }
}
impl<K: ClockKey> From<firstreaction::FirstReaction<K>> for AnySampler<K> {
    fn from(sampler: firstreaction::FirstReaction<K>) -> Self {
        Self::FirstReaction(sampler)
    }
}
impl<K: ClockKey> From<petri::Petri<K>> for AnySampler<K> {
    fn from(sampler: petri::Petri<K>) -> Self {
        Self::Petri(sampler)
    }
}
impl<K: ClockKey> From<reaction::CombinedNextReaction<K>> for AnySampler<K> {
    fn from(sampler: reaction::CombinedNextReaction<K>) -> Self {
        Self::NextReaction(sampler)
    }
}
impl<K: ClockKey> From<direct::MarkovDirect<K>> for AnySampler<K> {
    fn from(sampler: direct::MarkovDirect<K>) -> Self {
        Self::Direct(sampler)
    }
}
impl<K: ClockKey> From<multidirect::MultipleDirect<K>> for AnySampler<K> {
    fn from(sampler: multidirect::MultipleDirect<K>) -> Self {
        Self::MultipleDirect(sampler)
    }
}
impl<K: ClockKey> From<rssa::Rssa<K>> for AnySampler<K> {
    fn from(sampler: rssa::Rssa<K>) -> Self {
        Self::Rssa(sampler)
    }
}
impl<K: ClockKey> From<pssacr::Pssacr<K>> for AnySampler<K> {
    fn from(sampler: pssacr::Pssacr<K>) -> Self {
        Self::Pssacr(sampler)
    }
}
impl<K: ClockKey> From<MultiSampler<K>> for AnySampler<K> {
    fn from(sampler: MultiSampler<K>) -> Self {
        Self::Multi(Box::new(sampler))
    }
}
