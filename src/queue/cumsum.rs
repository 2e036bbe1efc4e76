use super::PrefixSum;

/// cumulative-sum array with a lazily rebuilt prefix table.
///
/// updates mark the table stale; the next total or locate rebuilds it
/// in one pass. cheaper than a tree when batches of updates land
/// between draws, which is how the partitioned direct sampler uses it.
#[derive(Debug, Clone, Default)]
pub struct CumulativeArray {
    raw: Vec<f64>,
    cum: Vec<f64>,
    stale: bool,
}

impl CumulativeArray {
    pub fn new() -> Self {
        Self::default()
    }

    fn freshen(&mut self) {
        if self.stale {
            self.cum.clear();
            let mut acc = 0.0;
            self.cum.extend(self.raw.iter().map(|w| {
                acc += w;
                acc
            }));
            self.stale = false;
        }
    }
}

impl PrefixSum for CumulativeArray {
    fn len(&self) -> usize {
        self.raw.len()
    }

    fn push(&mut self, weight: f64) -> usize {
        self.raw.push(weight);
        self.stale = true;
        self.raw.len() - 1
    }

    fn set(&mut self, index: usize, weight: f64) {
        self.raw[index] = weight;
        self.stale = true;
    }

    fn weight(&self, index: usize) -> f64 {
        self.raw[index]
    }

    fn total(&mut self) -> f64 {
        self.freshen();
        self.cum.last().copied().unwrap_or(0.0)
    }

    fn locate(&mut self, target: f64) -> usize {
        self.freshen();
        let found = self.cum.partition_point(|&acc| acc <= target);
        found.min(self.raw.len().saturating_sub(1))
    }

    fn clear(&mut self) {
        self.raw.clear();
        self.cum.clear();
        self.stale = false;
    }
}
