use std::collections::BTreeMap;

/// which concrete law a Dist value carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistKind {
    Exponential,
    Weibull,
    Gamma,
    Erlang,
    LogNormal,
    Normal,
    Laplace,
    Uniform,
    Dirac,
    Never,
}

impl std::fmt::Display for DistKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// whether residual survival for a law is tracked as S or as ln S
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingSpace {
    Linear,
    Logarithmic,
}

/// per-kind choice of survival space for the next-reaction samplers.
///
/// laws whose survival decays fast enough to underflow a double are
/// tracked in log space by default; the host can override any kind.
#[derive(Debug, Clone, Default)]
pub struct SpaceRegistry {
    overrides: BTreeMap<DistKind, SamplingSpace>,
}

impl SpaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: DistKind, space: SamplingSpace) -> &mut Self {
        self.overrides.insert(kind, space);
        self
    }

    pub fn space(&self, kind: DistKind) -> SamplingSpace {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or(match kind {
                DistKind::Exponential
                | DistKind::Gamma
                | DistKind::Erlang
                | DistKind::Weibull
                | DistKind::Laplace => SamplingSpace::Logarithmic,
                _ => SamplingSpace::Linear,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spaces() {
        let registry = SpaceRegistry::new();
        assert!(registry.space(DistKind::Exponential) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Weibull) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Gamma) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Erlang) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Laplace) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Uniform) == SamplingSpace::Linear);
        assert!(registry.space(DistKind::Normal) == SamplingSpace::Linear);
        assert!(registry.space(DistKind::Never) == SamplingSpace::Linear);
    }

    #[test]
    fn host_overrides_win() {
        let mut registry = SpaceRegistry::new();
        registry.register(DistKind::Uniform, SamplingSpace::Logarithmic);
        registry.register(DistKind::Exponential, SamplingSpace::Linear);
        assert!(registry.space(DistKind::Uniform) == SamplingSpace::Logarithmic);
        assert!(registry.space(DistKind::Exponential) == SamplingSpace::Linear);
        assert!(registry.space(DistKind::Weibull) == SamplingSpace::Logarithmic);
    }
}
