pub mod cumsum;
pub mod fenwick;
pub mod heap;
pub mod sample;

/// weighted-index structures shared by the propensity samplers.
///
/// both implementations keep a dense array of nonnegative weights and
/// answer "which index does this point in [0, total) land on" in
/// logarithmic time. removal is expressed by zeroing a weight; the
/// owner recycles dense slots itself.
pub trait PrefixSum {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// append a slot, returning its index
    fn push(&mut self, weight: f64) -> usize;
    fn set(&mut self, index: usize, weight: f64);
    fn weight(&self, index: usize) -> f64;
    fn total(&mut self) -> f64;
    /// first index whose running sum exceeds target, clamped into range
    fn locate(&mut self, target: f64) -> usize;
    fn clear(&mut self);
}
