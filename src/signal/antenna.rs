use nalgebra::Vector3;
use num_complex::Complex64;
use tracing::warn;

/// Value both IQ components are clamped to when a sample comes back as exactly zero.
pub const DEGENERATE_IQ_EPSILON: f64 = 1e-12;

/// Outcome of storing a sample into an antenna.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQuality {
    Valid,
    /// Both components were zero and have been clamped to the epsilon.
    Degenerate,
}

// ---------------------------------------------------------------------------
// Antenna: one array element, one complex baseband sample
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Antenna {
    mounting: Vector3<f64>, // fixed (u, v, w) offset from the carrier's orientation, rad
    sample: Complex64,
}

impl Antenna {
    pub fn new(mounting: Vector3<f64>) -> Self {
        Self { mounting, sample: Complex64::new(0.0, 0.0) }
    }

    pub fn mounting(&self) -> &Vector3<f64> {
        &self.mounting
    }

    pub fn sample(&self) -> Complex64 {
        self.sample
    }

    /// Overwrite the last sample.
    ///
    /// A sample whose power is not strictly positive (all zero, or so small
    /// that the squared magnitude underflows) has both
    /// components clamped to [`DEGENERATE_IQ_EPSILON`]. This usually hides
    /// a fault in the channel simulator, hence the warning.
    pub fn set_iq(&mut self, sample: Complex64) -> SampleQuality {
        if !(sample.norm_sqr() > 0.0) {
            warn!(
                "computed IQ too low, clamping Re = Im = {:e}",
                DEGENERATE_IQ_EPSILON
            );
            self.sample = Complex64::new(DEGENERATE_IQ_EPSILON, DEGENERATE_IQ_EPSILON);
            SampleQuality::Degenerate
        } else {
            self.sample = sample;
            SampleQuality::Valid
        }
    }

    /// Received signal strength: squared magnitude of the last sample.
    pub fn rss(&self) -> f64 {
        self.sample.norm_sqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rss_is_squared_magnitude() {
        let mut a = Antenna::new(Vector3::zeros());
        assert_eq!(a.set_iq(Complex64::new(3.0, -4.0)), SampleQuality::Valid);
        assert!((a.rss() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sample_is_clamped() {
        let mut a = Antenna::new(Vector3::zeros());
        assert_eq!(a.set_iq(Complex64::new(0.0, 0.0)), SampleQuality::Degenerate);
        assert_eq!(a.sample().re, DEGENERATE_IQ_EPSILON);
        assert_eq!(a.sample().im, DEGENERATE_IQ_EPSILON);
        assert!(a.rss() > 0.0 && a.rss().is_finite());
    }

    #[test]
    fn sample_is_overwritten_not_accumulated() {
        let mut a = Antenna::new(Vector3::zeros());
        a.set_iq(Complex64::new(1.0, 1.0));
        a.set_iq(Complex64::new(0.5, 0.0));
        assert!((a.rss() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn underflowing_sample_is_clamped() {
        let mut a = Antenna::new(Vector3::zeros());
        assert_eq!(a.set_iq(Complex64::new(1e-170, 0.0)), SampleQuality::Degenerate);
        assert!(a.rss() > 0.0, "rss {} should be strictly positive", a.rss());
    }

    #[test]
    fn single_zero_component_is_kept() {
        let mut a = Antenna::new(Vector3::zeros());
        assert_eq!(a.set_iq(Complex64::new(0.0, 2.0)), SampleQuality::Valid);
        assert!((a.rss() - 4.0).abs() < 1e-12);
    }
}
