use crate::distribution::registry::DistKind;

/// everything that can go wrong inside a sampler or a sampling context.
/// all failures surface to the caller; nothing retries or falls back silently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown clock {0}")]
    UnknownClock(String),

    #[error("{kind} clock handed to {sampler}, which samples exponential clocks only")]
    NotExponential {
        kind: DistKind,
        sampler: &'static str,
    },

    #[error("bad distribution: {0}")]
    BadDistribution(String),

    #[error("multi sampler has no chooser to route new clocks")]
    NoChooser,

    #[error("multi sampler has no child named {0}")]
    UnknownChild(String),

    #[error("bound factor {0} must be at least one")]
    BoundFactor(f64),

    #[error("group count must be nonzero")]
    NoGroups,

    #[error("{0} was not requested when this context was built")]
    FeatureDisabled(&'static str),

    #[error("distribution index {index} out of range for {count} distributions")]
    BadIndex { index: usize, count: usize },

    #[error("enable requires at least one distribution")]
    NoDistributions,
}

impl Error {
    /// keys are generic, so the unknown-clock payload is their debug rendering
    pub fn unknown<K: std::fmt::Debug>(clock: &K) -> Self {
        Self::UnknownClock(format!("{:?}", clock))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
