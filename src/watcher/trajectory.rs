use super::track::TrackWatcher;
use crate::distribution::univariate::Univariate;
use crate::ClockKey;
use crate::Error;
use crate::LogLikelihood;
use crate::Result;
use crate::Time;

/// running path log-likelihood over the trajectory so far.
///
/// every clock contributes the log-density of its firing and the
/// log-survival of every interval it sat enabled without firing; each
/// interval enters exactly once, at disable, fire, or evaluation
/// time. one accumulator per candidate distribution supports
/// importance reweighting between model variants that share a
/// trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryWatcher<K: ClockKey> {
    track: TrackWatcher<K>,
    running: Vec<LogLikelihood>,
}

impl<K: ClockKey> TrajectoryWatcher<K> {
    pub fn new(count: usize) -> Self {
        Self {
            track: TrackWatcher::new(),
            running: vec![0.0; count.max(1)],
        }
    }

    pub fn count(&self) -> usize {
        self.running.len()
    }

    pub fn track(&self) -> &TrackWatcher<K> {
        &self.track
    }

    pub fn enable(&mut self, clock: K, dists: Vec<crate::distribution::dist::Dist>, te: Time, when: Time) {
        self.track.enable(clock, dists, te, when);
    }

    /// survival over the enabled interval, then forget the clock
    pub fn disable(&mut self, clock: &K, when: Time) -> Result<()> {
        let entry = self.track.disable(clock)?;
        for (slot, acc) in self.running.iter_mut().enumerate() {
            let dist = entry.dist(slot);
            *acc += dist.logccdf(when - entry.te) - dist.logccdf(entry.when - entry.te);
        }
        Ok(())
    }

    /// density at the firing time, corrected for the survival already
    /// spent before the clock was enabled
    pub fn fire(&mut self, clock: &K, when: Time) -> Result<()> {
        let entry = self.track.disable(clock)?;
        for (slot, acc) in self.running.iter_mut().enumerate() {
            let dist = entry.dist(slot);
            *acc += dist.logpdf(when - entry.te) - dist.logccdf(entry.when - entry.te);
        }
        Ok(())
    }

    /// log-likelihood of "clock `which` fires at `when`, nothing else
    /// fires in (now, when)" against the current enabled set
    pub fn step(&self, now: Time, when: Time, which: &K, slot: usize) -> Result<LogLikelihood> {
        let firing = self.track.entry(which).ok_or_else(|| Error::unknown(which))?;
        let dist = firing.dist(slot);
        let mut acc = dist.logpdf(when - firing.te) - dist.logccdf(now - firing.te);
        for (clock, entry) in self.track.entries() {
            if clock != which {
                let dist = entry.dist(slot);
                acc += dist.logccdf(when - entry.te) - dist.logccdf(now - entry.te);
            }
        }
        Ok(acc)
    }

    /// the running total closed out with the survival of everything
    /// still enabled at the horizon
    pub fn path(&self, endtime: Time) -> Vec<LogLikelihood> {
        self.running
            .iter()
            .enumerate()
            .map(|(slot, acc)| {
                acc + self
                    .track
                    .entries()
                    .map(|(_, entry)| {
                        let dist = entry.dist(slot);
                        dist.logccdf(endtime - entry.te) - dist.logccdf(entry.when - entry.te)
                    })
                    .sum::<f64>()
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.track.reset();
        self.running.fill(0.0);
    }
}
