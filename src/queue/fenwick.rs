use super::PrefixSum;

/// binary indexed tree over nonnegative weights.
///
/// one-based internally; index zero of the tree vector is a dummy so
/// the usual lowbit arithmetic reads cleanly.
#[derive(Debug, Clone)]
pub struct FenwickTree {
    tree: Vec<f64>,
    raw: Vec<f64>,
}

impl Default for FenwickTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FenwickTree {
    pub fn new() -> Self {
        Self {
            tree: vec![0.0],
            raw: Vec::new(),
        }
    }

    /// sum of weights strictly before index
    fn prefix(&self, index: usize) -> f64 {
        let mut acc = 0.0;
        let mut i = index;
        while i > 0 {
            acc += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        acc
    }
}

impl PrefixSum for FenwickTree {
    fn len(&self) -> usize {
        self.raw.len()
    }

    fn push(&mut self, weight: f64) -> usize {
        let index = self.raw.len();
        let one_based = index + 1;
        // tree[i] covers the raw range (i - lowbit(i), i]
        let lowbit = one_based & one_based.wrapping_neg();
        let covered = self.prefix(index) - self.prefix(one_based - lowbit);
        self.raw.push(weight);
        self.tree.push(covered + weight);
        index
    }

    fn set(&mut self, index: usize, weight: f64) {
        let delta = weight - self.raw[index];
        self.raw[index] = weight;
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    fn weight(&self, index: usize) -> f64 {
        self.raw[index]
    }

    fn total(&mut self) -> f64 {
        self.prefix(self.raw.len())
    }

    fn locate(&mut self, target: f64) -> usize {
        let n = self.raw.len();
        if n == 0 {
            return 0;
        }
        let mut position = 0usize;
        let mut remainder = target;
        let mut step = n.next_power_of_two();
        while step > 0 {
            let probe = position + step;
            if probe <= n && self.tree[probe] <= remainder {
                remainder -= self.tree[probe];
                position = probe;
            }
            step >>= 1;
        }
        // roundoff can push the target past the final prefix
        position.min(n - 1)
    }

    fn clear(&mut self) {
        self.tree.clear();
        self.tree.push(0.0);
        self.raw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn totals_track_updates() {
        let mut tree = FenwickTree::new();
        for w in [1.0, 2.0, 3.0, 4.0] {
            tree.push(w);
        }
        assert!(tree.total() == 10.0);
        tree.set(1, 0.0);
        assert!(tree.total() == 8.0);
        tree.set(3, 1.5);
        assert!((tree.total() - 5.5).abs() < 1e-12);
    }

    #[test]
    fn locate_matches_linear_scan() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(9);
        let mut tree = FenwickTree::new();
        let mut raw = Vec::new();
        for _ in 0..257 {
            let w = rng.random::<f64>() * 3.0;
            tree.push(w);
            raw.push(w);
        }
        for _ in 0..64 {
            let i = rng.random_range(0..raw.len());
            let w = rng.random::<f64>() * 3.0;
            tree.set(i, w);
            raw[i] = w;
        }
        let total: f64 = raw.iter().sum();
        assert!((tree.total() - total).abs() < 1e-9);
        for _ in 0..1000 {
            let target = rng.random::<f64>() * total;
            let found = tree.locate(target);
            let mut acc = 0.0;
            let expect = raw
                .iter()
                .position(|&w| {
                    acc += w;
                    acc > target
                })
                .unwrap_or(raw.len() - 1);
            assert!(found == expect, "target {}", target);
        }
    }

    #[test]
    fn locate_clamps_overflowing_targets() {
        let mut tree = FenwickTree::new();
        tree.push(1.0);
        tree.push(2.0);
        assert!(tree.locate(3.0 + 1e-9) == 1);
        assert!(tree.locate(f64::INFINITY) == 1);
    }
}
