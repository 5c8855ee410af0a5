use serde::Serialize;

use crate::error::Error;

/// The full set of duration samples from one `measure`/`record` invocation.
///
/// Samples are fractional milliseconds. The sequence is never empty; derived
/// statistics are computed on demand rather than stored.
///
/// Standard deviation uses the sample estimator (divide by n − 1), and the
/// margin of error composes with the same estimator:
/// `1.96 × sqrt(variance / n)`, the 95%-confidence half-width under a normal
/// approximation. Both are 0 for a single sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    samples: Vec<f64>,
}

impl Measurement {
    /// Build a measurement from raw samples. Fails on an empty list.
    pub fn new(samples: Vec<f64>) -> Result<Self, Error> {
        if samples.is_empty() {
            return Err(Error::InvalidArgument(
                "a measurement needs at least one sample".into(),
            ));
        }
        Ok(Self { samples })
    }

    /// The raw duration samples, in milliseconds.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Arithmetic mean of the samples.
    pub fn mean(&self) -> f64 {
        mean(&self.samples)
    }

    /// Smallest sample.
    pub fn min(&self) -> f64 {
        min(&self.samples)
    }

    /// Largest sample.
    pub fn max(&self) -> f64 {
        max(&self.samples)
    }

    /// Sample standard deviation (n − 1 denominator).
    pub fn standard_deviation(&self) -> f64 {
        standard_deviation(&self.samples)
    }

    /// 95%-confidence margin of error.
    pub fn margin_of_error(&self) -> f64 {
        margin_of_error(&self.samples)
    }
}

pub(crate) fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

pub(crate) fn min(samples: &[f64]) -> f64 {
    samples.iter().copied().fold(f64::INFINITY, f64::min)
}

pub(crate) fn max(samples: &[f64]) -> f64 {
    samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn variance(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mean = mean(samples);
    samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64
}

pub(crate) fn standard_deviation(samples: &[f64]) -> f64 {
    variance(samples).sqrt()
}

pub(crate) fn margin_of_error(samples: &[f64]) -> f64 {
    1.96 * (variance(samples) / samples.len() as f64).sqrt()
}
