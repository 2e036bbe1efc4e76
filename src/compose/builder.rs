use super::context::SamplingContext;
use super::crn::CommonRandom;
use super::delay::ClockPhase;
use super::delay::DelayedState;
use super::multi::Chooser;
use super::multi::MultiSampler;
use super::multi::SamplerId;
use crate::distribution::dist::Dist;
use crate::distribution::registry::SpaceRegistry;
use crate::sampler::direct::MarkovDirect;
use crate::sampler::firstreaction::FirstReaction;
use crate::sampler::firsttofire::FirstToFire;
use crate::sampler::multidirect::MultipleDirect;
use crate::sampler::petri::Petri;
use crate::sampler::pssacr::Pssacr;
use crate::sampler::reaction::CombinedNextReaction;
use crate::sampler::rssa::Rssa;
use crate::sampler::AnySampler;
use crate::watcher::debug::DebugWatcher;
use crate::watcher::track::TrackWatcher;
use crate::watcher::trajectory::TrajectoryWatcher;
use crate::ClockKey;
use crate::Result;
use crate::Time;
use rand::Rng;
use std::sync::Arc;

/// which engine a context (or a multi-sampler child) runs on
#[derive(Debug, Clone)]
pub enum SamplerChoice {
    FirstToFire,
    FirstReaction,
    Petri,
    /// next-reaction with linear survival
    NextReaction,
    /// next-reaction with log survival
    ModifiedNextReaction,
    /// next-reaction with per-kind survival space
    CombinedNextReaction,
    Direct,
    MultipleDirect,
    Rssa {
        bound_factor: f64,
    },
    Pssacr {
        groups: usize,
    },
}

fn instantiate<K: ClockKey>(
    choice: &SamplerChoice,
    registry: &SpaceRegistry,
) -> Result<AnySampler<K>> {
    Ok(match choice {
        SamplerChoice::FirstToFire => FirstToFire::new().into(),
        SamplerChoice::FirstReaction => FirstReaction::new().into(),
        SamplerChoice::Petri => Petri::new().into(),
        SamplerChoice::NextReaction => CombinedNextReaction::linear().into(),
        SamplerChoice::ModifiedNextReaction => CombinedNextReaction::logarithmic().into(),
        SamplerChoice::CombinedNextReaction => {
            CombinedNextReaction::with_registry(registry.clone()).into()
        }
        SamplerChoice::Direct => MarkovDirect::new().into(),
        SamplerChoice::MultipleDirect => MultipleDirect::new().into(),
        SamplerChoice::Rssa { bound_factor } => Rssa::new(*bound_factor)?.into(),
        SamplerChoice::Pssacr { groups } => Pssacr::new(*groups)?.into(),
    })
}

/// assembles a sampling context: engine choice, feature layers, and
/// starting time. children plus a chooser build a multi sampler.
pub struct ContextBuilder<K: ClockKey> {
    choice: SamplerChoice,
    children: Vec<(SamplerId, SamplerChoice)>,
    chooser: Option<Chooser<K>>,
    registry: SpaceRegistry,
    start_time: Time,
    likelihood_cnt: usize,
    step_likelihood: bool,
    path_likelihood: bool,
    debug: bool,
    recording: bool,
    common_random: bool,
    support_delayed: bool,
}

impl<K: ClockKey> Default for ContextBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> ContextBuilder<K> {
    pub fn new() -> Self {
        Self {
            choice: SamplerChoice::CombinedNextReaction,
            children: Vec::new(),
            chooser: None,
            registry: SpaceRegistry::new(),
            start_time: 0.0,
            likelihood_cnt: 1,
            step_likelihood: false,
            path_likelihood: false,
            debug: false,
            recording: false,
            common_random: false,
            support_delayed: false,
        }
    }

    pub fn sampler(mut self, choice: SamplerChoice) -> Self {
        self.choice = choice;
        self
    }

    /// add a named child engine; any child makes the context a multi
    pub fn child(mut self, id: impl Into<SamplerId>, choice: SamplerChoice) -> Self {
        self.children.push((id.into(), choice));
        self
    }

    pub fn chooser(mut self, chooser: Arc<dyn Fn(&K, &Dist) -> SamplerId + Send + Sync>) -> Self {
        self.chooser = Some(chooser);
        self
    }

    pub fn registry(mut self, registry: SpaceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn start_time(mut self, start: Time) -> Self {
        self.start_time = start;
        self
    }

    pub fn step_likelihood(mut self) -> Self {
        self.step_likelihood = true;
        self
    }

    pub fn path_likelihood(mut self) -> Self {
        self.path_likelihood = true;
        self
    }

    /// importance sampling over this many candidate laws per clock;
    /// implies path likelihood
    pub fn likelihood_count(mut self, count: usize) -> Self {
        self.likelihood_cnt = count.max(1);
        self.path_likelihood = true;
        self
    }

    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn recording(mut self) -> Self {
        self.recording = true;
        self
    }

    pub fn common_random(mut self) -> Self {
        self.common_random = true;
        self
    }

    pub fn support_delayed(mut self) -> Self {
        self.support_delayed = true;
        self
    }

    pub fn build<R: Rng + Clone + PartialEq>(self, rng: R) -> Result<SamplingContext<K, R>>
    where
        K: 'static,
    {
        let sampler: AnySampler<ClockPhase<K>> = if self.children.is_empty() {
            instantiate(&self.choice, &self.registry)?
        } else {
            let mut multi = MultiSampler::new();
            for (id, choice) in self.children.iter() {
                multi = multi.with_child(id.clone(), instantiate(choice, &self.registry)?);
            }
            if let Some(user) = self.chooser {
                let wrapped: Chooser<ClockPhase<K>> =
                    Arc::new(move |clock: &ClockPhase<K>, dist: &Dist| user(&clock.key, dist));
                multi = multi.with_chooser(wrapped);
            }
            multi.into()
        };
        let likelihood = self.step_likelihood || self.path_likelihood;
        Ok(SamplingContext {
            sampler,
            rng,
            time: self.start_time,
            fixed_start: self.start_time,
            split_weight: 1.0,
            sample_index: 0,
            likelihood_cnt: self.likelihood_cnt,
            trajectory: likelihood.then(|| TrajectoryWatcher::new(self.likelihood_cnt)),
            track: self.recording.then(TrackWatcher::new),
            debug: self.debug.then(DebugWatcher::new),
            crn: self.common_random.then(CommonRandom::new),
            delayed: self.support_delayed.then(DelayedState::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn defaults_are_bare() {
        let ctx: SamplingContext<u32> = ContextBuilder::new()
            .build(Xoshiro256StarStar::seed_from_u64(1))
            .unwrap();
        assert!(ctx.time() == 0.0);
        assert!(ctx.trajectory.is_none());
        assert!(ctx.track.is_none());
        assert!(ctx.debug.is_none());
        assert!(ctx.crn.is_none());
        assert!(ctx.delayed.is_none());
    }

    #[test]
    fn start_time_anchors_reset() {
        let mut ctx: SamplingContext<u32> = ContextBuilder::new()
            .sampler(SamplerChoice::FirstToFire)
            .start_time(5.0)
            .build(Xoshiro256StarStar::seed_from_u64(2))
            .unwrap();
        assert!(ctx.time() == 5.0);
        ctx.enable(1, Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        let (when, _) = ctx.next();
        ctx.fire(1, when).unwrap();
        assert!(ctx.time() > 5.0);
        ctx.reset();
        assert!(ctx.time() == 5.0);
    }

    #[test]
    fn bad_engine_parameters_fail_the_build() {
        let err = ContextBuilder::<u32>::new()
            .sampler(SamplerChoice::Rssa { bound_factor: 0.3 })
            .build(Xoshiro256StarStar::seed_from_u64(3));
        assert!(matches!(err, Err(Error::BoundFactor(_))));
        let err = ContextBuilder::<u32>::new()
            .sampler(SamplerChoice::Pssacr { groups: 0 })
            .build(Xoshiro256StarStar::seed_from_u64(4));
        assert!(matches!(err, Err(Error::NoGroups)));
    }

    #[test]
    fn children_without_a_chooser_fail_on_first_enable() {
        let mut ctx: SamplingContext<u32> = ContextBuilder::new()
            .child("a", SamplerChoice::FirstToFire)
            .build(Xoshiro256StarStar::seed_from_u64(5))
            .unwrap();
        assert!(matches!(
            ctx.enable(1, Dist::exponential(1.0).unwrap(), 0.0),
            Err(Error::NoChooser)
        ));
    }
}
