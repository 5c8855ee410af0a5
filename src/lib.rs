//! Metron — in-process performance measurement for test suites.
//!
//! Metron times repeated executions of a unit of work, computes summary
//! statistics over the resulting duration samples, optionally fails the
//! calling test when a statistic exceeds a configured threshold, and
//! accumulates results into a hierarchical report keyed by human-readable
//! description paths.
//!
//! # Architecture
//!
//! The main building blocks are:
//!
//! - [`measure`]: the execution engine. Runs a zero-argument async unit of
//!   work a configured number of times (sequentially or overlapped on the
//!   current task) and returns a [`Measurement`] — one duration sample per
//!   run.
//! - [`Measurement`]: a non-empty list of millisecond samples with derived
//!   statistics (mean, min, max, standard deviation, 95%-confidence margin
//!   of error), computed on demand.
//! - [`MeasureOptions`]: per-call configuration — iteration count, execution
//!   mode, `before_each`/`after_each` hooks, and the `*_under` thresholds
//!   enforced by verification.
//! - [`Benchmark`]: the aggregation store. [`Benchmark::record`] times a unit
//!   of work, merges its samples into a tree of named nodes, broadcasts the
//!   measurement to subscribers, and only then applies threshold
//!   verification. [`Benchmark::report`] renders the tree as indented text.
//!
//! # Concurrency model
//!
//! Everything runs as overlapping asynchronous executions on a single logical
//! thread of control; nothing is spawned and no `Send` bound is required on
//! the unit of work. Serial mode (the default) suspends between iterations so
//! they never interfere; overlapped mode launches all iterations before
//! awaiting any, which is only appropriate when the work is safe to run
//! concurrently with itself.
//!
//! # Example
//!
//! ```rust
//! use metron::{Benchmark, MeasureOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metron::Error> {
//!     // Stores are constructed explicitly and passed around; there is no
//!     // hidden global instance.
//!     let mut bench = Benchmark::new();
//!
//!     bench
//!         .record(
//!             ["arithmetic", "sum of 1..1000"],
//!             || async {
//!                 std::hint::black_box((1..1_000u64).sum::<u64>());
//!             },
//!             &MeasureOptions::builder().iterations(50).mean_under(5.0).build(),
//!         )
//!         .await?;
//!
//!     println!("{}", bench.report());
//!     Ok(())
//! }
//! ```
//!
//! A failed threshold surfaces as [`Error::PerformanceExceeded`], naming the
//! statistic, its measured value, and the configured bound — a test-framework
//! adapter translates that into a failed test case. Reporter adapters,
//! snapshot files, and runner hooks live outside this crate and consume the
//! [`Benchmark::snapshot`] and subscription surfaces.

/// Aggregation store, description paths, and the record event
pub mod benchmark;
/// The repeated-execution timer
pub mod engine;
/// Error kinds and the work-failure passthrough
pub mod error;
/// Duration samples and their derived statistics
pub mod measurement;
/// Per-call configuration and iteration hooks
pub mod options;
/// Threshold verification
pub mod verify;

mod report;

pub use benchmark::{Benchmark, Listener, Path, Snapshot, SubscriptionId};
pub use engine::measure;
pub use error::{Error, Stat, WorkError};
pub use measurement::Measurement;
pub use options::{Hook, MeasureOptions, WorkOutput, hook};
