pub mod compose;
pub mod distribution;
pub mod error;
pub mod queue;
pub mod sampler;
pub mod watcher;

pub use error::Error;
pub use error::Result;

/// dimensional analysis types
pub type Time = f64;
pub type Rate = f64;
pub type LogLikelihood = f64;

// sampler parameters
pub(crate) const PSSACR_GROUPS: usize = 64;
pub(crate) const RSSA_BOUND_FACTOR: f64 = 1.05;

/// clock identifiers: anything ordered, hashable, cloneable, printable.
/// blanket-implemented so strings, integers, and tuples all qualify.
pub trait ClockKey: Clone + Ord + std::hash::Hash + std::fmt::Debug {}
impl<K: Clone + Ord + std::hash::Hash + std::fmt::Debug> ClockKey for K {}

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}
