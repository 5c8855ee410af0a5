//! The repeated-execution timer.
//!
//! [`measure`] runs a unit of work a configured number of times on the current
//! task and collects one duration sample per run. "Overlapped" mode launches
//! every iteration before awaiting any of them, so their bodies may interleave
//! on the single logical thread of control; nothing is ever spawned, which is
//! why the work needs no `Send` bound. There is no cancellation or timeout: a
//! hung unit of work stalls the whole call.

use std::time::Instant;

use futures::future::join_all;
use tracing::debug;

use crate::error::Error;
use crate::measurement::Measurement;
use crate::options::{MeasureOptions, WorkOutput};
use crate::verify;

/// Time `options.iterations` runs of `work` and return the resulting
/// [`Measurement`], verified against the configured thresholds.
///
/// Fails fast on `iterations == 0`, propagates the first failure raised by
/// the work or its hooks, and fails with
/// [`Error::PerformanceExceeded`] when a threshold is violated.
pub async fn measure<F, Fut>(work: F, options: &MeasureOptions) -> Result<Measurement, Error>
where
    F: Fn() -> Fut,
    Fut: Future,
    Fut::Output: WorkOutput,
{
    let measurement = run(&work, options).await?;
    verify::check(&measurement, options)?;
    Ok(measurement)
}

/// Engine body without threshold verification.
///
/// [`Benchmark`](crate::Benchmark) calls this directly so it can merge and
/// broadcast the measurement before any verdict is applied.
pub(crate) async fn run<F, Fut>(work: &F, options: &MeasureOptions) -> Result<Measurement, Error>
where
    F: Fn() -> Fut,
    Fut: Future,
    Fut::Output: WorkOutput,
{
    if options.iterations == 0 {
        return Err(Error::InvalidArgument("iterations must be at least 1".into()));
    }

    debug!(
        iterations = options.iterations,
        serial = options.serial,
        "starting measurement"
    );

    let samples = if options.serial {
        let mut samples = Vec::with_capacity(options.iterations);
        for _ in 0..options.iterations {
            // `?` here means no further iterations are attempted after a failure
            samples.push(run_once(work, options).await?);
        }
        samples
    } else {
        let runs = (0..options.iterations).map(|_| run_once(work, options));
        // All iterations settle before the first failure (in launch order) wins
        join_all(runs)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
    };

    Measurement::new(samples)
}

async fn run_once<F, Fut>(work: &F, options: &MeasureOptions) -> Result<f64, Error>
where
    F: Fn() -> Fut,
    Fut: Future,
    Fut::Output: WorkOutput,
{
    if let Some(before) = &options.before_each {
        before().await?;
    }

    let start = Instant::now();
    work().await.into_result()?;
    let sample = start.elapsed().as_secs_f64() * 1_000.0;

    if let Some(after) = &options.after_each {
        after().await?;
    }

    Ok(sample)
}
