use std::fmt;

use thiserror::Error;

/// Failure raised by a unit of work or one of its hooks.
///
/// The engine propagates these unchanged: no wrapping, no retries.
pub type WorkError = Box<dyn std::error::Error + Send + Sync>;

/// The statistic named by a threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Mean,
    Min,
    Max,
    MarginOfError,
    StandardDeviation,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stat::Mean => "mean",
            Stat::Min => "min",
            Stat::Max => "max",
            Stat::MarginOfError => "margin of error",
            Stat::StandardDeviation => "standard deviation",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong while measuring or recording.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was rejected before any work ran.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A measured statistic exceeded its configured threshold.
    #[error("performance exceeded: {stat} was {value:.5} ms, over the {threshold} ms threshold")]
    PerformanceExceeded {
        stat: Stat,
        value: f64,
        threshold: f64,
    },

    /// Failure from the unit of work or a hook, passed through as-is.
    #[error(transparent)]
    Work(#[from] WorkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performance_exceeded_names_the_statistic() {
        let err = Error::PerformanceExceeded {
            stat: Stat::MarginOfError,
            value: 1.5,
            threshold: 1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("margin of error"));
        assert!(msg.contains("1.50000"));
        assert!(msg.contains("1 ms threshold"));
    }
}
