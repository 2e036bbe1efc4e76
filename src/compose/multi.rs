use crate::distribution::dist::Dist;
use crate::sampler::AnySampler;
use crate::sampler::Sampler;
use crate::ClockKey;
use crate::Error;
use crate::Result;
use crate::Time;
use rand::RngCore;
use std::collections::BTreeMap;
use std::sync::Arc;

/// names a child engine inside a multi sampler
pub type SamplerId = String;

/// predicate that routes a clock, on first sight, to a child engine
pub type Chooser<K> = Arc<dyn Fn(&K, &Dist) -> SamplerId + Send + Sync>;

/// a composite engine that routes each clock to one child.
///
/// the chooser runs once per clock, at its first enable; the binding
/// sticks for the rest of that clock's life so residual-survival
/// state never migrates between children. `next` is the minimum over
/// children, which iterate in name order for determinism.
#[derive(Clone)]
pub struct MultiSampler<K: ClockKey> {
    children: BTreeMap<SamplerId, AnySampler<K>>,
    chooser: Option<Chooser<K>>,
    routes: BTreeMap<K, SamplerId>,
}

impl<K: ClockKey> std::fmt::Debug for MultiSampler<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MultiSampler")
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .finish()
    }
}

impl<K: ClockKey> Default for MultiSampler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClockKey> MultiSampler<K> {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            chooser: None,
            routes: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, id: impl Into<SamplerId>, child: impl Into<AnySampler<K>>) -> Self {
        self.children.insert(id.into(), child.into());
        self
    }

    pub fn with_chooser(mut self, chooser: Chooser<K>) -> Self {
        self.chooser = Some(chooser);
        self
    }

    /// the child a clock is bound to, if it has been seen
    pub fn route(&self, clock: &K) -> Option<&SamplerId> {
        self.routes.get(clock)
    }

    fn child_of(&mut self, clock: &K) -> Result<&mut AnySampler<K>> {
        let id = self.routes.get(clock).ok_or_else(|| Error::unknown(clock))?;
        Ok(self.children.get_mut(id).expect("routes point at children"))
    }
}

impl<K: ClockKey> Sampler<K> for MultiSampler<K> {
    fn enable(
        &mut self,
        clock: K,
        dist: &Dist,
        te: Time,
        when: Time,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let id = match self.routes.get(&clock) {
            Some(id) => id.clone(),
            None => {
                let chooser = self.chooser.as_ref().ok_or(Error::NoChooser)?;
                let id = chooser(&clock, dist);
                if !self.children.contains_key(&id) {
                    return Err(Error::UnknownChild(id));
                }
                self.routes.insert(clock.clone(), id.clone());
                id
            }
        };
        self.children
            .get_mut(&id)
            .expect("routes point at children")
            .enable(clock, dist, te, when, rng)
    }

    fn disable(&mut self, clock: &K, when: Time) -> Result<()> {
        self.child_of(clock)?.disable(clock, when)
    }

    fn fire(&mut self, clock: &K, when: Time) -> Result<()> {
        self.child_of(clock)?.fire(clock, when)
    }

    fn next(&mut self, when: Time, rng: &mut dyn RngCore) -> (Time, Option<K>) {
        self.children
            .values_mut()
            .map(|child| child.next(when, rng))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .unwrap_or((f64::INFINITY, None))
    }

    fn jitter(&mut self, when: Time, rng: &mut dyn RngCore) {
        for child in self.children.values_mut() {
            child.jitter(when, rng);
        }
    }

    fn reset(&mut self) {
        for child in self.children.values_mut() {
            child.reset();
        }
        self.routes.clear();
    }

    fn len(&self) -> usize {
        self.children.values().map(|child| child.len()).sum()
    }

    fn contains(&self, clock: &K) -> bool {
        self.children.values().any(|child| child.contains(clock))
    }

    fn keys(&self) -> Vec<K> {
        self.children.values().flat_map(|child| child.keys()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::univariate::Univariate;
    use crate::sampler::direct::MarkovDirect;
    use crate::sampler::firsttofire::FirstToFire;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn by_kind() -> MultiSampler<u32> {
        MultiSampler::new()
            .with_child("direct", MarkovDirect::new())
            .with_child("heap", FirstToFire::new())
            .with_chooser(Arc::new(|_: &u32, dist: &Dist| {
                if dist.rate().is_some() {
                    "direct".into()
                } else {
                    "heap".into()
                }
            }))
    }

    #[test]
    fn routes_by_distribution_and_counts_across_children() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut multi = by_kind();
        for clock in 0..3 {
            multi
                .enable(clock, &Dist::exponential(2.0).unwrap(), 0.0, 0.0, &mut rng)
                .unwrap();
        }
        for clock in 3..5 {
            multi
                .enable(clock, &Dist::weibull(2.0, 5.0).unwrap(), 0.0, 0.0, &mut rng)
                .unwrap();
        }
        assert!(multi.len() == 5);
        assert!(multi.route(&0) == Some(&"direct".to_string()));
        assert!(multi.route(&4) == Some(&"heap".to_string()));
        let mut keys = multi.keys();
        keys.sort();
        assert!(keys == vec![0, 1, 2, 3, 4]);
        for clock in 0..5 {
            multi.disable(&clock, 0.0).unwrap();
        }
        assert!(multi.len() == 0);
        assert!(multi.next(0.0, &mut rng) == (f64::INFINITY, None));
    }

    #[test]
    fn next_is_the_minimum_over_children() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let mut multi = by_kind();
        multi
            .enable(0, &Dist::exponential(3.0).unwrap(), 0.0, 0.0, &mut rng)
            .unwrap();
        multi
            .enable(1, &Dist::weibull(2.0, 5.0).unwrap(), 0.0, 0.0, &mut rng)
            .unwrap();
        let (when, who) = multi.next(0.0, &mut rng);
        let floor = multi
            .children
            .values_mut()
            .map(|child| child.next(0.0, &mut rng).0)
            .fold(f64::INFINITY, f64::min);
        assert!(when == floor);
        assert!(who.is_some());
    }

    #[test]
    fn missing_chooser_is_an_error() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut multi = MultiSampler::new().with_child("only", FirstToFire::new());
        let err = multi.enable(0u32, &Dist::never(), 0.0, 0.0, &mut rng);
        assert!(matches!(err, Err(Error::NoChooser)));
    }

    #[test]
    fn chooser_naming_a_missing_child_is_an_error() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(4);
        let mut multi = MultiSampler::new()
            .with_child("a", FirstToFire::new())
            .with_chooser(Arc::new(|_: &u32, _: &Dist| "b".into()));
        let err = multi.enable(0, &Dist::never(), 0.0, 0.0, &mut rng);
        assert!(matches!(err, Err(Error::UnknownChild(_))));
    }

    #[test]
    fn bindings_stick_across_reenables() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut multi = by_kind();
        multi
            .enable(7, &Dist::exponential(1.0).unwrap(), 0.0, 0.0, &mut rng)
            .unwrap();
        multi.disable(&7, 1.0).unwrap();
        // still routed to direct, so a non-exponential law now fails
        let err = multi.enable(7, &Dist::weibull(2.0, 5.0).unwrap(), 0.0, 1.0, &mut rng);
        assert!(matches!(err, Err(Error::NotExponential { .. })));
    }
}
