use super::Sampler;
use crate::distribution::dist::Dist;
use crate::distribution::registry::SamplingSpace;
use crate::distribution::registry::SpaceRegistry;
use crate::distribution::univariate::unit;
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

/// how the engine picks a survival space per distribution
#[derive(Debug, Clone)]
pub enum SpacePolicy {
    Fixed(SamplingSpace),
    ByKind(SpaceRegistry),
}

/// one clock's enrollment with the engine.
///
/// the record outlives disabling so a later re-enable can spend the
/// residual survival instead of redrawing, which is what keeps
/// history-dependent hazards unbiased. survival is S in linear space
/// and ln S in log space; the zero sentinel (0 or -inf) marks a draw
/// as consumed by `next`.
#[derive(Debug, Clone)]
struct Transition {
    handle: Option<Handle>,
    survival: f64,
    dist: Dist,
    te: Time,
    t0: Time,
    space: SamplingSpace,
}

fn zero(space: SamplingSpace) -> f64 {
    match space {
        SamplingSpace::Linear => 0.0,
        SamplingSpace::Logarithmic => f64::NEG_INFINITY,
    }
}

fn consumed(record: &Transition) -> bool {
    match record.space {
        SamplingSpace::Linear => record.survival <= 0.0,
        SamplingSpace::Logarithmic => record.survival == f64::NEG_INFINITY,
    }
}

fn convert(survival: f64, from: SamplingSpace, to: SamplingSpace) -> f64 {
    match (from, to) {
        (SamplingSpace::Linear, SamplingSpace::Logarithmic) => survival.ln(),
        (SamplingSpace::Logarithmic, SamplingSpace::Linear) => survival.exp(),
        _ => survival,
    }
}

/// te drift below a couple of ulps still counts as the same enabling
fn close(a: Time, b: Time) -> bool {
    a == b || (a - b).abs() <= 2.0 * f64::EPSILON * a.abs().max(b.abs())
}

/// draw a firing time and its survival target, truncating at the
/// elapsed offset when the distribution zero lies in the past
fn sample_shifted(
    dist: &Dist,
    te: Time,
    when: Time,
    space: SamplingSpace,
    rng: &mut dyn RngCore,
) -> (Time, f64) {
    let u = unit(rng);
    match space {
        SamplingSpace::Linear => {
            if te < when {
                (te + dist.cquantile(u * dist.ccdf(when - te)), u)
            } else {
                (te + dist.cquantile(u), u)
            }
        }
        SamplingSpace::Logarithmic => {
            let lnu = u.ln();
            if te < when {
                (te + dist.invlogccdf(lnu + dist.logccdf(when - te)), lnu)
            } else {
                (te + dist.invlogccdf(lnu), lnu)
            }
        }
    }
}

/// firing time for a stored survival target against a (possibly new)
/// distribution, truncated at the current time
fn sample_by_inversion(
    dist: &Dist,
    te: Time,
    when: Time,
    survival: f64,
    space: SamplingSpace,
) -> Time {
    match space {
        SamplingSpace::Linear => {
            if te < when {
                te + dist.cquantile(survival * dist.ccdf(when - te))
            } else {
                te + dist.cquantile(survival)
            }
        }
        SamplingSpace::Logarithmic => {
            if te < when {
                te + dist.invlogccdf(survival + dist.logccdf(when - te))
            } else {
                te + dist.invlogccdf(survival)
            }
        }
    }
}

/// survival left after the clock ran from its last anchor out to tn.
/// both factors clamp to one when te has not been reached yet.
fn consume_survival(record: &Transition, tn: Time) -> f64 {
    match record.space {
        SamplingSpace::Linear => {
            let te_tn = if record.te < tn {
                record.dist.ccdf(tn - record.te)
            } else {
                1.0
            };
            let te_t0 = if record.te < record.t0 {
                record.dist.ccdf(record.t0 - record.te)
            } else {
                1.0
            };
            record.survival / (te_tn * te_t0)
        }
        SamplingSpace::Logarithmic => {
            let te_tn = if record.te < tn {
                record.dist.logccdf(tn - record.te)
            } else {
                0.0
            };
            let te_t0 = if record.te < record.t0 {
                record.dist.logccdf(record.t0 - record.te)
            } else {
                0.0
            };
            record.survival - (te_tn + te_t0)
        }
    }
}

/// next-reaction engine over both survival spaces.
///
/// each clock draws a survival target exactly once per life cycle and
/// spends it across enables, disables, and distribution swaps. the
/// fixed-space constructors give the classic linear formulation and
/// the log-space formulation of Anderson; the registry constructor
/// picks per distribution kind, which is the combined engine.
#[derive(Debug, Clone)]
pub struct CombinedNextReaction<K: ClockKey> {
    queue: FiringQueue<K>,
    records: BTreeMap<K, Transition>,
    policy: SpacePolicy,
}

impl<K: ClockKey> Default for CombinedNextReaction<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> CombinedNextReaction<K> {
    /// per-kind space selection with the default registry
    pub fn new() -> Self {
        Self::with_registry(SpaceRegistry::new())
    }

    /// classic next-reaction method: survival tracked as S
    pub fn linear() -> Self {
        Self::fixed(SamplingSpace::Linear)
    }

    /// modified next-reaction method: survival tracked as ln S
    pub fn logarithmic() -> Self {
        Self::fixed(SamplingSpace::Logarithmic)
    }

    pub fn with_registry(registry: SpaceRegistry) -> Self {
        Self {
            queue: FiringQueue::new(),
            records: BTreeMap::new(),
            policy: SpacePolicy::ByKind(registry),
        }
    }

    fn fixed(space: SamplingSpace) -> Self {
        Self {
            queue: FiringQueue::new(),
            records: BTreeMap::new(),
            policy: SpacePolicy::Fixed(space),
        }
    }

    fn space_for(&self, dist: &Dist) -> SamplingSpace {
        match &self.policy {
            SpacePolicy::Fixed(space) => *space,
            SpacePolicy::ByKind(registry) => registry.space(dist.kind()),
        }
    }

    /// stored survival for a clock, in that clock's sampling space.
    /// diagnostic; None for clocks the engine has never seen.
    pub fn residual(&self, clock: &K) -> Option<f64> {
        self.records.get(clock).map(|record| record.survival)
    }
}

impl<K: ClockKey> Sampler<K> for CombinedNextReaction<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        te: Time,
        when: Time,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let space = self.space_for(dist);
        match self.records.get_mut(&clock) {
            Some(record) if !consumed(record) && record.handle.is_some() => {
                // live clock: a matching (te, distribution) is a no-op,
                // anything else spends the residual against the new law
                if close(te, record.te) && *dist == record.dist {
                    return Ok(());
                }
                let survival = convert(consume_survival(record, when), record.space, space);
                let tau = sample_by_inversion(dist, te, when, survival, space);
                self.queue.update(record.handle.expect("live"), tau);
                record.survival = survival;
                record.dist = dist.clone();
                record.te = te;
                record.t0 = when;
                record.space = space;
            }
            Some(record) if !consumed(record) => {
                // disabled with residual retained: re-invert it
                let survival = convert(record.survival, record.space, space);
                let tau = sample_by_inversion(dist, te, when, survival, space);
                let handle = self.queue.push(OrderedSample::new(clock, tau));
                record.handle = Some(handle);
                record.survival = survival;
                record.dist = dist.clone();
                record.te = te;
                record.t0 = when;
                record.space = space;
            }
            other => {
                // never enabled, or its draw was consumed: start over
                let stale = other.and_then(|record| record.handle);
                let (tau, survival) = sample_shifted(dist, te, when, space, rng);
                let handle = match stale {
                    Some(handle) => {
                        self.queue.update(handle, tau);
                        handle
                    }
                    None => self.queue.push(OrderedSample::new(clock.clone(), tau)),
                };
                self.records.insert(
                    clock,
                    Transition {
                        handle: Some(handle),
                        survival,
                        dist: dist.clone(),
                        te,
                        t0: when,
                        space,
                    },
                );
            }
        }
        Ok(())
    }

    fn disable(&mut self, clock: &K, when: Time) -> Result<()> {
        let record = self
            .records
            .get_mut(clock)
            .ok_or_else(|| Error::unknown(clock))?;
        let handle = record.handle.take().ok_or_else(|| Error::unknown(clock))?;
        self.queue.remove(handle);
        let survival = consume_survival(record, when);
        record.survival = survival;
        record.t0 = when;
        Ok(())
    }

    fn next(&mut self, when: Time, _rng: &mut dyn RngCore) -> (Time, Option<K>) {
        match self.queue.peek() {
            Some(top) => {
                let time = top.time.max(when);
                let key = top.key.clone();
                let record = self
                    .records
                    .get_mut(&key)
                    .expect("queued clocks keep records");
                record.survival = zero(record.space);
                (time, Some(key))
            }
            None => (f64::INFINITY, None),
        }
    }

    fn jitter(&mut self, when: Time, rng: &mut dyn RngCore) {
        for record in self.records.values_mut() {
            if let Some(handle) = record.handle {
                let (tau, survival) =
                    sample_shifted(&record.dist, record.te, when, record.space, rng);
                record.survival = survival;
                record.t0 = when;
                self.queue.update(handle, tau);
            }
        }
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn contains(&self, clock: &K) -> bool {
        self.records
            .get(clock)
            .map(|record| record.handle.is_some())
            .unwrap_or(false)
    }

    fn keys(&self) -> Vec<K> {
        self.records
            .iter()
            .filter(|(_, record)| record.handle.is_some())
            .map(|(clock, _)| clock.clone())
            .collect()
    }
}
