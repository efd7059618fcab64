use std::{
    future::Future,
    pin::Pin,
};

pub type JobFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A self-contained unit of work for the [`FanOutCollector`](super::FanOutCollector).
///
/// A job owns everything it touches, its output accumulator included, so jobs
/// never share mutable state with each other.
pub trait Job: Send + 'static {
    type Output: Send + 'static;

    /// Name used in log lines.
    fn name(&self) -> String;

    /// Runs the job to completion. Failures are part of the output.
    fn run(self) -> JobFuture<Self::Output>;
}
