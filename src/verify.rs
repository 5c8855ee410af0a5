//! Threshold verification.
//!
//! Compares a [`Measurement`]'s statistics against the upper bounds configured
//! in [`MeasureOptions`]. Checks run in a fixed order (mean, min, max, margin
//! of error, standard deviation) and only the first violation is reported.

use crate::error::{Error, Stat};
use crate::measurement::Measurement;
use crate::options::MeasureOptions;

/// Fail with [`Error::PerformanceExceeded`] if any defined threshold is
/// strictly exceeded. Always succeeds when `options.verify` is false.
pub fn check(measurement: &Measurement, options: &MeasureOptions) -> Result<(), Error> {
    if !options.verify {
        return Ok(());
    }

    let checks = [
        (Stat::Mean, measurement.mean(), options.mean_under),
        (Stat::Min, measurement.min(), options.min_under),
        (Stat::Max, measurement.max(), options.max_under),
        (
            Stat::MarginOfError,
            measurement.margin_of_error(),
            options.margin_of_error_under,
        ),
        (
            Stat::StandardDeviation,
            measurement.standard_deviation(),
            options.standard_deviation_under,
        ),
    ];

    for (stat, value, threshold) in checks {
        let Some(threshold) = threshold else { continue };
        if value > threshold {
            return Err(Error::PerformanceExceeded {
                stat,
                value,
                threshold,
            });
        }
    }

    Ok(())
}
