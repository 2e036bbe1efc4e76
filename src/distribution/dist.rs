use super::registry::DistKind;
use super::univariate::unit;
use super::univariate::Univariate;
use crate::Arbitrary;
use crate::Error;
use crate::Rate;
use crate::Result;
use rand::Rng;
use rand::RngCore;
use statrs::distribution::Continuous;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Erlang;
use statrs::distribution::Exp;
use statrs::distribution::Gamma;
use statrs::distribution::Laplace;
use statrs::distribution::LogNormal;
use statrs::distribution::Normal;
use statrs::distribution::Uniform;
use statrs::distribution::Weibull;
use statrs::statistics::Max;
use statrs::statistics::Min;

/// the concrete univariate laws shipped with the crate.
///
/// exponential and weibull carry closed-form survival math so their
/// log-space quantiles stay exact deep in the tail; the heavier laws
/// delegate to statrs. Dirac is a point mass for deterministic delays
/// and Never is the "known not to fire" sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Dist {
    Exponential(Exp),
    Weibull(Weibull),
    Gamma(Gamma),
    Erlang(Erlang),
    LogNormal(LogNormal),
    Normal(Normal),
    Laplace(Laplace),
    Uniform(Uniform),
    Dirac(f64),
    Never,
}

fn badparam<E: std::fmt::Display>(e: E) -> Error {
    Error::BadDistribution(e.to_string())
}

impl Dist {
    pub fn exponential(rate: f64) -> Result<Self> {
        Exp::new(rate).map(Self::Exponential).map_err(badparam)
    }
    pub fn weibull(shape: f64, scale: f64) -> Result<Self> {
        Weibull::new(shape, scale).map(Self::Weibull).map_err(badparam)
    }
    pub fn gamma(shape: f64, rate: f64) -> Result<Self> {
        Gamma::new(shape, rate).map(Self::Gamma).map_err(badparam)
    }
    pub fn erlang(shape: u64, rate: f64) -> Result<Self> {
        Erlang::new(shape, rate).map(Self::Erlang).map_err(badparam)
    }
    pub fn lognormal(location: f64, scale: f64) -> Result<Self> {
        LogNormal::new(location, scale).map(Self::LogNormal).map_err(badparam)
    }
    pub fn normal(mean: f64, stddev: f64) -> Result<Self> {
        Normal::new(mean, stddev).map(Self::Normal).map_err(badparam)
    }
    pub fn laplace(location: f64, scale: f64) -> Result<Self> {
        Laplace::new(location, scale).map(Self::Laplace).map_err(badparam)
    }
    pub fn uniform(lo: f64, hi: f64) -> Result<Self> {
        Uniform::new(lo, hi).map(Self::Uniform).map_err(badparam)
    }
    pub fn dirac(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Self::Dirac(value))
        } else {
            Err(Error::BadDistribution(format!("dirac at {}", value)))
        }
    }
    pub fn never() -> Self {
        Self::Never
    }

    pub fn kind(&self) -> DistKind {
        match self {
            Self::Exponential(_) => DistKind::Exponential,
            Self::Weibull(_) => DistKind::Weibull,
            Self::Gamma(_) => DistKind::Gamma,
            Self::Erlang(_) => DistKind::Erlang,
            Self::LogNormal(_) => DistKind::LogNormal,
            Self::Normal(_) => DistKind::Normal,
            Self::Laplace(_) => DistKind::Laplace,
            Self::Uniform(_) => DistKind::Uniform,
            Self::Dirac(_) => DistKind::Dirac,
            Self::Never => DistKind::Never,
        }
    }
}

impl Univariate for Dist {
    fn pdf(&self, x: f64) -> f64 {
        match self {
            Self::Exponential(d) => d.pdf(x),
            Self::Weibull(d) => d.pdf(x),
            Self::Gamma(d) => d.pdf(x),
            Self::Erlang(d) => d.pdf(x),
            Self::LogNormal(d) => d.pdf(x),
            Self::Normal(d) => d.pdf(x),
            Self::Laplace(d) => d.pdf(x),
            Self::Uniform(d) => d.pdf(x),
            Self::Dirac(c) => {
                if x == *c {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
            Self::Never => 0.0,
        }
    }

    fn logpdf(&self, x: f64) -> f64 {
        match self {
            Self::Exponential(d) => {
                if x < 0.0 {
                    f64::NEG_INFINITY
                } else {
                    d.rate().ln() - d.rate() * x
                }
            }
            Self::Weibull(d) => d.ln_pdf(x),
            Self::Gamma(d) => d.ln_pdf(x),
            Self::Erlang(d) => d.ln_pdf(x),
            Self::LogNormal(d) => d.ln_pdf(x),
            Self::Normal(d) => d.ln_pdf(x),
            Self::Laplace(d) => d.ln_pdf(x),
            Self::Uniform(d) => d.ln_pdf(x),
            Self::Dirac(c) => {
                if x == *c {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                }
            }
            Self::Never => f64::NEG_INFINITY,
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        match self {
            Self::Exponential(d) => d.cdf(x),
            Self::Weibull(d) => d.cdf(x),
            Self::Gamma(d) => d.cdf(x),
            Self::Erlang(d) => d.cdf(x),
            Self::LogNormal(d) => d.cdf(x),
            Self::Normal(d) => d.cdf(x),
            Self::Laplace(d) => d.cdf(x),
            Self::Uniform(d) => d.cdf(x),
            Self::Dirac(c) => {
                if x < *c {
                    0.0
                } else {
                    1.0
                }
            }
            Self::Never => 0.0,
        }
    }

    fn ccdf(&self, x: f64) -> f64 {
        match self {
            Self::Exponential(d) => {
                if x <= 0.0 {
                    1.0
                } else {
                    (-d.rate() * x).exp()
                }
            }
            Self::Weibull(d) => {
                if x <= 0.0 {
                    1.0
                } else {
                    (-(x / d.scale()).powf(d.shape())).exp()
                }
            }
            Self::Gamma(d) => d.sf(x),
            Self::Erlang(d) => d.sf(x),
            Self::LogNormal(d) => d.sf(x),
            Self::Normal(d) => d.sf(x),
            Self::Laplace(d) => d.sf(x),
            Self::Uniform(d) => d.sf(x),
            Self::Dirac(c) => {
                if x < *c {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Never => 1.0,
        }
    }

    fn logccdf(&self, x: f64) -> f64 {
        match self {
            Self::Exponential(d) => {
                if x <= 0.0 {
                    0.0
                } else {
                    -d.rate() * x
                }
            }
            Self::Weibull(d) => {
                if x <= 0.0 {
                    0.0
                } else {
                    -(x / d.scale()).powf(d.shape())
                }
            }
            Self::Dirac(c) => {
                if x < *c {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            }
            Self::Never => 0.0,
            _ => self.ccdf(x).ln(),
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Self::Exponential(d) => -f64::ln_1p(-p) / d.rate(),
            Self::Weibull(d) => d.scale() * (-f64::ln_1p(-p)).powf(1.0 / d.shape()),
            Self::Gamma(d) => d.inverse_cdf(p),
            Self::Erlang(d) => d.inverse_cdf(p),
            Self::LogNormal(d) => d.inverse_cdf(p),
            Self::Normal(d) => d.inverse_cdf(p),
            Self::Laplace(d) => d.inverse_cdf(p),
            Self::Uniform(d) => d.inverse_cdf(p),
            Self::Dirac(c) => *c,
            Self::Never => f64::INFINITY,
        }
    }

    fn cquantile(&self, s: f64) -> f64 {
        let s = s.clamp(0.0, 1.0);
        match self {
            Self::Exponential(d) => -s.ln() / d.rate(),
            Self::Weibull(d) => d.scale() * (-s.ln()).powf(1.0 / d.shape()),
            Self::Dirac(c) => {
                if s > 0.0 {
                    *c
                } else {
                    f64::INFINITY
                }
            }
            Self::Never => f64::INFINITY,
            _ => self.quantile(1.0 - s),
        }
    }

    fn invlogccdf(&self, ls: f64) -> f64 {
        let ls = ls.min(0.0);
        match self {
            Self::Exponential(d) => -ls / d.rate(),
            Self::Weibull(d) => d.scale() * (-ls).powf(1.0 / d.shape()),
            Self::Never => f64::INFINITY,
            _ => self.cquantile(ls.exp()),
        }
    }

    /// conditioning an exponential on exceeding lo is a pure shift,
    /// and this arm preserves that identity exactly, same draw for draw
    fn sample_trunc(&self, lo: f64, rng: &mut dyn RngCore) -> f64 {
        match self {
            Self::Exponential(_) => lo.max(0.0) + self.sample(rng),
            _ => {
                if lo <= 0.0 {
                    self.sample(rng)
                } else {
                    self.cquantile(unit(rng) * self.ccdf(lo))
                }
            }
        }
    }

    fn rate(&self) -> Option<Rate> {
        match self {
            Self::Exponential(d) => Some(d.rate()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dist {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Exponential(d) => write!(f, "Exponential({})", d.rate()),
            Self::Weibull(d) => write!(f, "Weibull({}, {})", d.shape(), d.scale()),
            Self::Gamma(d) => write!(f, "Gamma({}, {})", d.shape(), d.rate()),
            Self::Erlang(d) => write!(f, "Erlang({}, {})", d.shape(), d.rate()),
            Self::LogNormal(d) => write!(f, "{:?}", d),
            Self::Normal(d) => write!(f, "{:?}", d),
            Self::Laplace(d) => write!(f, "{:?}", d),
            Self::Uniform(d) => write!(f, "Uniform({}, {})", d.min(), d.max()),
            Self::Dirac(c) => write!(f, "Dirac({})", c),
            Self::Never => write!(f, "Never"),
        }
    }
}

impl Arbitrary for Dist {
    fn random() -> Self {
        let mut rng = rand::rng();
        match rng.random_range(0..4usize) {
            0 => Self::exponential(rng.random_range(0.1..4.0)).expect("positive rate"),
            1 => Self::weibull(rng.random_range(0.5..3.0), rng.random_range(0.5..5.0))
                .expect("positive shape and scale"),
            2 => Self::gamma(rng.random_range(0.5..4.0), rng.random_range(0.2..2.0))
                .expect("positive shape and rate"),
            _ => Self::lognormal(rng.random_range(-1.0..1.0), rng.random_range(0.2..1.0))
                .expect("positive scale"),
        }
    }
}
