use crate::Rate;
use rand::Rng;
use rand::RngCore;

/// a uniform draw on the half-open interval (0, 1].
/// excluding zero keeps logarithms and divisions finite downstream.
pub fn unit(rng: &mut dyn RngCore) -> f64 {
    1.0 - rng.random::<f64>()
}

/// the interface consumed from univariate probability laws.
///
/// every sampler in this crate talks to distributions through these
/// methods and nothing else. sampling is by inversion, exactly one
/// uniform per draw, so that replaying a recorded generator state
/// reproduces the same value bit for bit.
pub trait Univariate {
    fn pdf(&self, x: f64) -> f64;
    fn logpdf(&self, x: f64) -> f64;
    fn cdf(&self, x: f64) -> f64;
    /// survival, P(X > x)
    fn ccdf(&self, x: f64) -> f64;
    fn logccdf(&self, x: f64) -> f64;
    fn quantile(&self, p: f64) -> f64;
    /// inverse survival, the x with ccdf(x) = s
    fn cquantile(&self, s: f64) -> f64;
    fn invlogccdf(&self, ls: f64) -> f64;

    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.cquantile(unit(rng))
    }

    /// draw conditioned on exceeding lo
    fn sample_trunc(&self, lo: f64, rng: &mut dyn RngCore) -> f64 {
        if lo <= 0.0 {
            self.sample(rng)
        } else {
            self.cquantile(unit(rng) * self.ccdf(lo))
        }
    }

    /// Some only for the exponential law; gates the propensity samplers
    fn rate(&self) -> Option<Rate> {
        None
    }
}
