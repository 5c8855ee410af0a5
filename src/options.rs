use futures::future::BoxFuture;
use typed_builder::TypedBuilder;

use crate::error::WorkError;

/// What a unit of work (or a hook) may resolve to.
///
/// Infallible work returns `()`; fallible work returns a `Result` whose error
/// converts into a [`WorkError`]. Either way the engine observes a single
/// `Result<(), WorkError>` per invocation.
pub trait WorkOutput {
    fn into_result(self) -> Result<(), WorkError>;
}

impl WorkOutput for () {
    fn into_result(self) -> Result<(), WorkError> {
        Ok(())
    }
}

impl<E: Into<WorkError>> WorkOutput for Result<(), E> {
    fn into_result(self) -> Result<(), WorkError> {
        self.map_err(Into::into)
    }
}

/// Boxed asynchronous hook run around each iteration, outside the timed window.
pub type Hook = Box<dyn Fn() -> BoxFuture<'static, Result<(), WorkError>> + Send + Sync>;

/// Wrap an async closure into a [`Hook`].
///
/// ```rust
/// use metron::{MeasureOptions, hook};
///
/// let options = MeasureOptions::builder()
///     .before_each(hook(|| async { /* reset state */ }))
///     .build();
/// # let _ = options;
/// ```
pub fn hook<F, Fut>(f: F) -> Hook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: WorkOutput,
{
    Box::new(move || {
        let fut = f();
        Box::pin(async move { fut.await.into_result() })
    })
}

/// Configuration for a single `measure`/`record` call.
///
/// Thresholds are upper bounds in milliseconds; a statistic strictly greater
/// than its bound fails the call when `verify` is on.
#[derive(TypedBuilder)]
pub struct MeasureOptions {
    /// Number of timed repetitions.
    #[builder(default = 100)]
    pub iterations: usize,

    /// Run iterations strictly one after another. When false, all iterations
    /// are launched before any is awaited and may overlap.
    #[builder(default = true)]
    pub serial: bool,

    /// Whether thresholds are enforced after the run.
    #[builder(default = true)]
    pub verify: bool,

    #[builder(default, setter(strip_option))]
    pub mean_under: Option<f64>,

    #[builder(default, setter(strip_option))]
    pub min_under: Option<f64>,

    #[builder(default, setter(strip_option))]
    pub max_under: Option<f64>,

    #[builder(default, setter(strip_option))]
    pub margin_of_error_under: Option<f64>,

    #[builder(default, setter(strip_option))]
    pub standard_deviation_under: Option<f64>,

    /// Run before every iteration, outside the timed window.
    #[builder(default, setter(strip_option))]
    pub before_each: Option<Hook>,

    /// Run after every iteration, outside the timed window.
    #[builder(default, setter(strip_option))]
    pub after_each: Option<Hook>,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}
