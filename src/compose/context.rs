use super::crn::CommonRandom;
use super::delay::ClockPhase;
use super::delay::Delayed;
use super::delay::DelayedState;
use super::delay::Phase;
use crate::distribution::dist::Dist;
use crate::sampler::AnySampler;
use crate::sampler::Sampler;
use crate::watcher::debug::DebugWatcher;
use crate::watcher::track::TrackWatcher;
use crate::watcher::trajectory::TrajectoryWatcher;
use crate::ClockKey;
use crate::Error;
use crate::LogLikelihood;
use crate::Result;
use crate::Time;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

/// the top-level facade a host simulation drives.
///
/// owns one sampling engine, one generator, the current simulation
/// time, and whichever optional layers were requested at build time:
/// likelihood accounting, enabled-set recording, debug logs, common
/// random numbers, delayed-reaction expansion. absent layers cost a
/// branch on None and nothing else.
///
/// a context is single-threaded by design; run independent clones in
/// parallel instead of sharing one.
#[derive(Debug, Clone)]
pub struct SamplingContext<K: ClockKey, R = Xoshiro256StarStar> {
    pub(crate) sampler: AnySampler<ClockPhase<K>>,
    pub(crate) rng: R,
    pub(crate) time: Time,
    pub(crate) fixed_start: Time,
    pub(crate) split_weight: f64,
    pub(crate) sample_index: usize,
    pub(crate) likelihood_cnt: usize,
    pub(crate) trajectory: Option<TrajectoryWatcher<ClockPhase<K>>>,
    pub(crate) track: Option<TrackWatcher<ClockPhase<K>>>,
    pub(crate) debug: Option<DebugWatcher<ClockPhase<K>>>,
    pub(crate) crn: Option<CommonRandom<ClockPhase<K>, R>>,
    pub(crate) delayed: Option<DelayedState<K>>,
}

impl<K: ClockKey, R: Rng + Clone + PartialEq> SamplingContext<K, R> {
    /// absolute simulation time, advanced by `fire`
    pub fn time(&self) -> Time {
        self.time
    }

    pub fn split_weight(&self) -> f64 {
        self.split_weight
    }

    pub fn keytype(&self) -> &'static str {
        std::any::type_name::<K>()
    }

    pub fn timetype(&self) -> &'static str {
        std::any::type_name::<Time>()
    }

    pub fn len(&self) -> usize {
        self.sampler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sampler.is_empty()
    }

    pub fn is_enabled(&self, clock: &K) -> bool {
        Self::phases()
            .iter()
            .any(|&phase| self.sampler.contains(&ClockPhase { key: clock.clone(), phase }))
    }

    /// user keys with any phase pending
    pub fn enabled(&self) -> Vec<K> {
        self.sampler.keys().into_iter().map(|ck| ck.key).collect()
    }

    pub fn keys(&self) -> Vec<K> {
        self.enabled()
    }

    fn phases() -> [Phase; 3] {
        [Phase::Regular, Phase::Initiate, Phase::Complete]
    }

    /// the phase a user clock is currently pending under
    fn active_phase(&self, clock: &K) -> Phase {
        Self::phases()
            .into_iter()
            .find(|&phase| self.sampler.contains(&ClockPhase { key: clock.clone(), phase }))
            .unwrap_or(Phase::Regular)
    }

    pub fn enable(&mut self, clock: K, dist: Dist, relative_te: Time) -> Result<()> {
        self.enable_all(clock, vec![dist], relative_te)
    }

    /// vector form: every law enters the likelihood, the selected one
    /// drives the sampler
    pub fn enable_all(&mut self, clock: K, dists: Vec<Dist>, relative_te: Time) -> Result<()> {
        if dists.is_empty() {
            return Err(Error::NoDistributions);
        }
        self.enable_inner(ClockPhase::regular(clock), dists, relative_te)
    }

    /// delayed form: the initiation law runs now, the duration law is
    /// parked until initiation fires
    pub fn enable_delayed(&mut self, clock: K, delayed: Delayed, relative_te: Time) -> Result<()> {
        let state = self
            .delayed
            .as_mut()
            .ok_or(Error::FeatureDisabled("support_delayed"))?;
        state.store(clock.clone(), delayed.duration);
        self.enable_inner(ClockPhase::initiate(clock), vec![delayed.initiation], relative_te)
    }

    fn enable_inner(
        &mut self,
        key: ClockPhase<K>,
        dists: Vec<Dist>,
        relative_te: Time,
    ) -> Result<()> {
        let te = self.time + relative_te;
        let when = self.time;
        let pick = self.sample_index.min(dists.len() - 1);
        if let Some(watcher) = &mut self.trajectory {
            watcher.enable(key.clone(), dists.clone(), te, when);
        }
        if let Some(watcher) = &mut self.track {
            watcher.enable(key.clone(), dists.clone(), te, when);
        }
        let dist = &dists[pick];
        match &mut self.crn {
            Some(crn) => crn.enable(&mut self.sampler, key.clone(), dist, te, when, &mut self.rng)?,
            None => self.sampler.enable(key.clone(), dist, te, when, &mut self.rng)?,
        }
        if let Some(debug) = &mut self.debug {
            debug.enable(key, when);
        }
        Ok(())
    }

    pub fn disable(&mut self, clock: &K) -> Result<()> {
        let phase = self.active_phase(clock);
        let key = ClockPhase {
            key: clock.clone(),
            phase,
        };
        let when = self.time;
        if let Some(watcher) = &mut self.trajectory {
            watcher.disable(&key, when)?;
        }
        if let Some(watcher) = &mut self.track {
            watcher.disable(&key)?;
        }
        self.sampler.disable(&key, when)?;
        if let Some(debug) = &mut self.debug {
            debug.disable(key, when);
        }
        // an abandoned delayed reaction drops its parked duration
        if phase != Phase::Regular {
            if let Some(state) = &mut self.delayed {
                state.take(clock);
            }
        }
        Ok(())
    }

    /// next firing over user keys; delayed hosts that need the phase
    /// use `next_delayed`
    pub fn next(&mut self) -> (Time, Option<K>) {
        let (when, key) = self.sampler.next(self.time, &mut self.rng);
        (when, key.map(|ck| ck.key))
    }

    pub fn next_delayed(&mut self) -> (Time, Option<(K, Phase)>) {
        let (when, key) = self.sampler.next(self.time, &mut self.rng);
        (when, key.map(|ck| (ck.key, ck.phase)))
    }

    pub fn fire(&mut self, clock: K, when: Time) -> Result<()> {
        self.fire_phase(clock, Phase::Regular, when)
    }

    pub fn fire_phase(&mut self, clock: K, phase: Phase, when: Time) -> Result<()> {
        let key = ClockPhase {
            key: clock.clone(),
            phase,
        };
        if let Some(watcher) = &mut self.trajectory {
            watcher.fire(&key, when)?;
        }
        if let Some(watcher) = &mut self.track {
            watcher.disable(&key)?;
        }
        self.sampler.fire(&key, when)?;
        if let Some(debug) = &mut self.debug {
            debug.fire(key, when);
        }
        self.time = when;
        match phase {
            Phase::Initiate => {
                // initiation opens the completion window at `when`
                let duration = self
                    .delayed
                    .as_ref()
                    .and_then(|state| state.duration(&clock).cloned())
                    .ok_or_else(|| Error::unknown(&clock))?;
                self.enable_inner(ClockPhase::complete(clock), vec![duration], 0.0)?;
            }
            Phase::Complete => {
                if let Some(state) = &mut self.delayed {
                    state.take(&clock);
                }
            }
            Phase::Regular => {}
        }
        Ok(())
    }

    /// back to the fixed start: clocks, watchers, and logs cleared,
    /// crn recordings kept but rewound
    pub fn reset(&mut self) {
        self.sampler.reset();
        if let Some(watcher) = &mut self.trajectory {
            watcher.reset();
        }
        if let Some(watcher) = &mut self.track {
            watcher.reset();
        }
        if let Some(debug) = &mut self.debug {
            debug.reset();
        }
        if let Some(crn) = &mut self.crn {
            crn.rewind();
        }
        if let Some(state) = &mut self.delayed {
            state.reset();
        }
        self.time = self.fixed_start;
        self.split_weight = 1.0;
        self.sample_index = 0;
    }

    /// an independent context with its own generator
    pub fn clone_with(&self, rng: R) -> Self {
        let mut branch = self.clone();
        branch.rng = rng;
        branch
    }

    /// adopt the pending clocks of another context, then jitter so
    /// the branches diverge
    pub fn copy_clocks(&mut self, source: &Self) {
        self.sampler = source.sampler.clone();
        self.trajectory = source.trajectory.clone();
        self.track = source.track.clone();
        self.delayed = source.delayed.clone();
        self.time = source.time;
        self.sampler.jitter(self.time, &mut self.rng);
    }

    /// particle splitting: every destination adopts this context's
    /// clocks and the importance weight is shared evenly
    pub fn split_into(&mut self, branches: &mut [Self]) {
        let share = self.split_weight / (branches.len() + 1) as f64;
        self.split_weight = share;
        for branch in branches.iter_mut() {
            branch.copy_clocks(self);
            branch.split_weight = share;
        }
    }

    /// choose which law of a vector enabling drives the sampler
    pub fn sample_from_distribution(&mut self, index: usize) -> Result<()> {
        if index < self.likelihood_cnt {
            self.sample_index = index;
            Ok(())
        } else {
            Err(Error::BadIndex {
                index,
                count: self.likelihood_cnt,
            })
        }
    }

    pub fn freeze_crn(&mut self) -> Result<()> {
        self.crn
            .as_mut()
            .ok_or(Error::FeatureDisabled("common_random"))?
            .freeze();
        Ok(())
    }

    pub fn reset_crn(&mut self) -> Result<()> {
        self.crn
            .as_mut()
            .ok_or(Error::FeatureDisabled("common_random"))?
            .reset();
        Ok(())
    }

    pub fn crn_misses(&self) -> Result<usize> {
        Ok(self
            .crn
            .as_ref()
            .ok_or(Error::FeatureDisabled("common_random"))?
            .misses())
    }

    /// log-likelihood of `which` firing at `when` with nothing else
    /// firing since the current time
    pub fn steploglikelihood(&self, when: Time, which: &K) -> Result<LogLikelihood> {
        let phase = self.active_phase(which);
        let key = ClockPhase {
            key: which.clone(),
            phase,
        };
        self.trajectory
            .as_ref()
            .ok_or(Error::FeatureDisabled("likelihood"))?
            .step(self.time, when, &key, self.sample_index)
    }

    /// accumulated path log-likelihood out to a horizon, one entry
    /// per candidate distribution slot
    pub fn pathloglikelihood(&self, endtime: Time) -> Result<Vec<LogLikelihood>> {
        Ok(self
            .trajectory
            .as_ref()
            .ok_or(Error::FeatureDisabled("likelihood"))?
            .path(endtime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::builder::ContextBuilder;
    use crate::compose::builder::SamplerChoice;
    use crate::distribution::univariate::Univariate;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn rng(seed: u64) -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(seed)
    }

    fn race_context(choice: SamplerChoice, seed: u64) -> SamplingContext<&'static str> {
        ContextBuilder::new()
            .sampler(choice)
            .build(rng(seed))
            .unwrap()
    }

    /// two-clock exponential race, the analytic workhorse: with rates
    /// 2 and 3 the first event is Exp(5) and clock a wins 40% of runs
    fn run_race(choice: SamplerChoice, seed: u64) -> (f64, f64) {
        let mut ctx = race_context(choice, seed);
        let trials = 60_000;
        let mut wins = 0usize;
        let mut total = 0.0;
        for _ in 0..trials {
            ctx.reset();
            ctx.enable("a", Dist::exponential(2.0).unwrap(), 0.0).unwrap();
            ctx.enable("b", Dist::exponential(3.0).unwrap(), 0.0).unwrap();
            let (when, who) = ctx.next();
            assert!(when >= 0.0);
            if who == Some("a") {
                wins += 1;
            }
            total += when;
        }
        (wins as f64 / trials as f64, total / trials as f64)
    }

    #[test]
    fn master_equation_direct() {
        let (share, mean) = run_race(SamplerChoice::Direct, 101);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_first_reaction() {
        let (share, mean) = run_race(SamplerChoice::FirstReaction, 102);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_first_to_fire() {
        let (share, mean) = run_race(SamplerChoice::FirstToFire, 103);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_next_reaction() {
        let (share, mean) = run_race(SamplerChoice::CombinedNextReaction, 104);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_multiple_direct() {
        let (share, mean) = run_race(SamplerChoice::MultipleDirect, 109);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_linear_and_log_reactions() {
        for (choice, seed) in [
            (SamplerChoice::NextReaction, 110),
            (SamplerChoice::ModifiedNextReaction, 111),
        ] {
            let (share, mean) = run_race(choice, seed);
            assert!((share - 0.4).abs() < 0.008, "share {}", share);
            assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
        }
    }

    #[test]
    fn master_equation_rssa() {
        let (share, mean) = run_race(SamplerChoice::Rssa { bound_factor: 1.1 }, 105);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn master_equation_pssacr() {
        let (share, mean) = run_race(SamplerChoice::Pssacr { groups: 8 }, 106);
        assert!((share - 0.4).abs() < 0.008, "share {}", share);
        assert!((mean - 0.2).abs() < 0.006, "mean {}", mean);
    }

    #[test]
    fn rssa_and_direct_agree_on_wide_rate_spreads() {
        // one hundred exponential clocks spanning three decades; both
        // engines must reproduce the analytic marginal of the winner
        let rates: Vec<f64> = (0..100)
            .map(|i| 0.01 * 1000f64.powf(i as f64 / 99.0))
            .collect();
        let total: f64 = rates.iter().sum();
        let trials = 200_000;
        for (choice, seed) in [
            (SamplerChoice::Direct, 107),
            (SamplerChoice::Rssa { bound_factor: 1.1 }, 108),
        ] {
            let mut ctx: SamplingContext<usize> = ContextBuilder::new()
                .sampler(choice)
                .build(rng(seed))
                .unwrap();
            for (i, rate) in rates.iter().enumerate() {
                ctx.enable(i, Dist::exponential(*rate).unwrap(), 0.0).unwrap();
            }
            let mut hits = vec![0usize; rates.len()];
            for _ in 0..trials {
                ctx.sampler.jitter(0.0, &mut ctx.rng);
                let (_, who) = ctx.next();
                hits[who.unwrap()] += 1;
            }
            let variation: f64 = hits
                .iter()
                .zip(rates.iter())
                .map(|(&h, &r)| (h as f64 / trials as f64 - r / total).abs())
                .sum::<f64>()
                / 2.0;
            assert!(variation < 0.02, "total variation {}", variation);
        }
    }

    #[test]
    fn context_time_advances_with_fires() {
        let mut ctx = race_context(SamplerChoice::CombinedNextReaction, 2);
        assert!(ctx.time() == 0.0);
        ctx.enable("x", Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        ctx.enable("y", Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        let (t1, who) = ctx.next();
        ctx.fire(who.unwrap(), t1).unwrap();
        assert!(ctx.time() == t1);
        let (t2, who) = ctx.next();
        assert!(t2 >= t1);
        ctx.fire(who.unwrap(), t2).unwrap();
        assert!(ctx.len() == 0);
        assert!(ctx.next() == (f64::INFINITY, None));
        ctx.reset();
        assert!(ctx.time() == 0.0);
    }

    #[test]
    fn introspection_reports_the_enabled_set() {
        let mut ctx = race_context(SamplerChoice::FirstToFire, 3);
        ctx.enable("a", Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        ctx.enable("b", Dist::weibull(2.0, 5.0).unwrap(), 0.5).unwrap();
        assert!(ctx.len() == 2);
        assert!(ctx.is_enabled(&"a"));
        assert!(!ctx.is_enabled(&"z"));
        let mut keys = ctx.keys();
        keys.sort();
        assert!(keys == vec!["a", "b"]);
        assert!(ctx.keytype().contains("str"));
        assert!(ctx.timetype() == "f64");
        ctx.disable(&"a").unwrap();
        assert!(!ctx.is_enabled(&"a"));
        assert!(matches!(ctx.disable(&"a"), Err(Error::UnknownClock(_))));
    }

    #[test]
    fn multi_context_routes_and_aggregates() {
        let mut ctx: SamplingContext<u32> = ContextBuilder::new()
            .child("direct", SamplerChoice::Direct)
            .child("heap", SamplerChoice::FirstToFire)
            .chooser(Arc::new(|_: &u32, dist: &Dist| {
                if dist.rate().is_some() {
                    "direct".into()
                } else {
                    "heap".into()
                }
            }))
            .build(rng(4))
            .unwrap();
        for clock in 0..3 {
            ctx.enable(clock, Dist::exponential(2.0).unwrap(), 0.0).unwrap();
        }
        for clock in 3..5 {
            ctx.enable(clock, Dist::weibull(2.0, 5.0).unwrap(), 0.0).unwrap();
        }
        assert!(ctx.len() == 5);
        let (when, who) = ctx.next();
        assert!(when.is_finite());
        assert!(who.is_some());
        for clock in 0..5 {
            ctx.disable(&clock).unwrap();
        }
        assert!(ctx.len() == 0);
    }

    #[test]
    fn delayed_reactions_run_in_two_phases() {
        let mut ctx: SamplingContext<&'static str> = ContextBuilder::new()
            .sampler(SamplerChoice::FirstToFire)
            .support_delayed()
            .build(rng(5))
            .unwrap();
        let delayed = Delayed::new(
            Dist::exponential(1.0).unwrap(),
            Dist::normal(3.0, 0.1).unwrap(),
        );
        ctx.enable_delayed("x", delayed, 0.0).unwrap();
        let (ti, pending) = ctx.next_delayed();
        let (who, phase) = pending.unwrap();
        assert!(who == "x");
        assert!(phase == Phase::Initiate);
        assert!(ti > 0.0);
        ctx.fire_phase("x", Phase::Initiate, ti).unwrap();
        let (tc, pending) = ctx.next_delayed();
        let (who, phase) = pending.unwrap();
        assert!(who == "x");
        assert!(phase == Phase::Complete);
        assert!(tc - ti > 2.0 && tc - ti < 4.0);
        ctx.fire_phase("x", Phase::Complete, tc).unwrap();
        assert!(ctx.len() == 0);
        assert!(ctx.next_delayed().1.is_none());
    }

    #[test]
    fn delayed_enable_requires_the_feature() {
        let mut ctx = race_context(SamplerChoice::FirstToFire, 6);
        let delayed = Delayed::new(Dist::exponential(1.0).unwrap(), Dist::dirac(1.0).unwrap());
        assert!(matches!(
            ctx.enable_delayed("x", delayed, 0.0),
            Err(Error::FeatureDisabled(_))
        ));
    }

    #[test]
    fn crn_replay_matches_the_recorded_run() {
        let mut ctx: SamplingContext<&'static str> = ContextBuilder::new()
            .sampler(SamplerChoice::FirstToFire)
            .common_random()
            .build(rng(7))
            .unwrap();
        let dist = Dist::weibull(2.0, 5.0).unwrap();
        let mut run = |ctx: &mut SamplingContext<&'static str>| {
            ctx.reset();
            for clock in ["a", "b", "c"] {
                ctx.enable(clock, dist.clone(), 0.0).unwrap();
            }
            let mut trace = Vec::new();
            while let (when, Some(who)) = ctx.next() {
                ctx.fire(who, when).unwrap();
                trace.push((when, who));
            }
            trace
        };
        let first = run(&mut ctx);
        assert!(first.len() == 3);
        ctx.freeze_crn().unwrap();
        let second = run(&mut ctx);
        assert!(first == second);
        assert!(ctx.crn_misses().unwrap() == 0);
        // a fourth clock has no recording: exactly one miss, the rest replay
        ctx.reset();
        for clock in ["a", "b", "c", "d"] {
            ctx.enable(clock, dist.clone(), 0.0).unwrap();
        }
        assert!(ctx.crn_misses().unwrap() == 1);
    }

    #[test]
    fn crn_controls_require_the_feature() {
        let mut ctx = race_context(SamplerChoice::FirstToFire, 8);
        assert!(matches!(ctx.freeze_crn(), Err(Error::FeatureDisabled(_))));
        assert!(matches!(ctx.reset_crn(), Err(Error::FeatureDisabled(_))));
        assert!(matches!(ctx.crn_misses(), Err(Error::FeatureDisabled(_))));
    }

    #[test]
    fn path_likelihood_closes_over_the_trajectory() {
        let mut ctx: SamplingContext<&'static str> = ContextBuilder::new()
            .sampler(SamplerChoice::CombinedNextReaction)
            .path_likelihood()
            .build(rng(9))
            .unwrap();
        ctx.enable("a", Dist::exponential(2.0).unwrap(), 0.0).unwrap();
        ctx.enable("b", Dist::exponential(3.0).unwrap(), 0.0).unwrap();
        let (when, who) = ctx.next();
        let step = ctx.steploglikelihood(when, &who.unwrap()).unwrap();
        ctx.fire(who.unwrap(), when).unwrap();
        ctx.disable(&if who == Some("a") { "b" } else { "a" }).unwrap();
        let path = ctx.pathloglikelihood(when).unwrap();
        let rate = if who == Some("a") { 2.0f64 } else { 3.0 };
        let expect = rate.ln() - 5.0 * when;
        assert!((path[0] - expect).abs() < 1e-9, "path {}", path[0]);
        assert!((step - expect).abs() < 1e-9, "step {}", step);
    }

    #[test]
    fn likelihood_requires_a_watcher() {
        let ctx = race_context(SamplerChoice::CombinedNextReaction, 10);
        assert!(matches!(
            ctx.pathloglikelihood(1.0),
            Err(Error::FeatureDisabled(_))
        ));
        assert!(matches!(
            ctx.steploglikelihood(1.0, &"a"),
            Err(Error::FeatureDisabled(_))
        ));
    }

    #[test]
    fn vector_enables_select_the_sampling_law() {
        let mut ctx: SamplingContext<&'static str> = ContextBuilder::new()
            .sampler(SamplerChoice::FirstToFire)
            .likelihood_count(2)
            .build(rng(11))
            .unwrap();
        let laws = vec![Dist::dirac(5.0).unwrap(), Dist::dirac(1.0).unwrap()];
        ctx.enable_all("x", laws.clone(), 0.0).unwrap();
        assert!(ctx.next().0 == 5.0);
        ctx.sample_from_distribution(1).unwrap();
        ctx.enable_all("x", laws, 0.0).unwrap();
        assert!(ctx.next().0 == 1.0);
        assert!(matches!(
            ctx.sample_from_distribution(2),
            Err(Error::BadIndex { .. })
        ));
        assert!(matches!(
            ctx.enable_all("y", vec![], 0.0),
            Err(Error::NoDistributions)
        ));
    }

    #[test]
    fn split_shares_weight_and_decorrelates() {
        let mut source = race_context(SamplerChoice::CombinedNextReaction, 12);
        for clock in ["a", "b", "c"] {
            source.enable(clock, Dist::weibull(2.0, 4.0).unwrap(), 0.0).unwrap();
        }
        let mut branches = vec![
            source.clone_with(rng(13)),
            source.clone_with(rng(14)),
            source.clone_with(rng(15)),
        ];
        source.split_into(&mut branches);
        assert!(source.split_weight() == 0.25);
        for branch in branches.iter() {
            assert!(branch.split_weight() == 0.25);
            assert!(branch.len() == 3);
        }
        let (t0, _) = branches[0].next();
        let (t1, _) = branches[1].next();
        let (ts, _) = source.next();
        assert!(t0 != t1);
        assert!(t0 != ts);
    }

    #[test]
    fn debug_watcher_sees_every_mutation() {
        let mut ctx: SamplingContext<&'static str> = ContextBuilder::new()
            .sampler(SamplerChoice::FirstToFire)
            .debug()
            .recording()
            .build(rng(16))
            .unwrap();
        ctx.enable("a", Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        ctx.enable("b", Dist::exponential(1.0).unwrap(), 0.0).unwrap();
        let (when, who) = ctx.next();
        ctx.fire(who.unwrap(), when).unwrap();
        ctx.disable(&if who == Some("a") { "b" } else { "a" }).unwrap();
        let debug = ctx.debug.as_ref().unwrap();
        assert!(debug.enables.len() == 2);
        assert!(debug.fires.len() == 1);
        assert!(debug.disables.len() == 1);
        let track = ctx.track.as_ref().unwrap();
        assert!(track.is_empty());
    }
}
