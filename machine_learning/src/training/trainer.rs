use std::time::{Duration, Instant};

use log::{debug, info};
use ndarray::ArrayView2;

use crate::{
    MlErr, Result,
    arch::{
        Network,
        loss::{LossFn, Mse},
    },
};

/// Iteration guard used unless configured otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000_000;

/// Progress is logged once every this many iterations by default.
pub const DEFAULT_LOG_EVERY: usize = 1000;

/// The outcome of a converged training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub iterations: usize,
    pub elapsed: Duration,
    pub final_loss: f32,
}

/// Trains a `Network` with full-batch steps until the loss drops to a threshold.
///
/// There is no fixed epoch count. Training stops as soon as the loss over the whole dataset
/// is at most `max_loss`, or fails with `DidNotConverge` once `max_iterations` steps were
/// taken or `max_duration` has elapsed.
#[derive(Debug, Clone)]
pub struct ConvergenceTrainer<L: LossFn = Mse> {
    loss_fn: L,
    max_loss: f32,
    max_iterations: usize,
    max_duration: Option<Duration>,
    log_every: usize,
}

impl ConvergenceTrainer<Mse> {
    /// Creates a new `ConvergenceTrainer` minimizing the mean squared error.
    ///
    /// # Arguments
    /// * `max_loss` - The loss under which the network is considered trained.
    pub fn new(max_loss: f32) -> Self {
        Self::with_loss_fn(Mse::new(), max_loss)
    }
}

impl<L: LossFn> ConvergenceTrainer<L> {
    /// Creates a new `ConvergenceTrainer` minimizing `loss_fn`.
    pub fn with_loss_fn(loss_fn: L, max_loss: f32) -> Self {
        Self {
            loss_fn,
            max_loss,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_duration: None,
            log_every: DEFAULT_LOG_EVERY,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    /// Sets the progress logging period, `0` disables it.
    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Trains `network` on `(x, y)` until it converges.
    ///
    /// # Arguments
    /// * `network` - The network, its weights are updated in place.
    /// * `x` - The inputs, one sample per row.
    /// * `y` - The expected outputs, one row per sample.
    ///
    /// # Returns
    /// The amount of steps taken, the time it took and the final loss, or `DidNotConverge`
    /// if a guard expired first.
    pub fn train(
        &self,
        network: &mut Network,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<TrainingReport> {
        if x.nrows() == 0 {
            return Err(MlErr::DegenerateInput("there are no samples to train on"));
        }

        let expected = (x.nrows(), network.shape().output);
        if y.dim() != expected {
            return Err(MlErr::ShapeMismatch {
                what: "y",
                got: y.dim(),
                expected,
            });
        }

        info!(
            samples = x.nrows(),
            max_loss = self.max_loss;
            "training until converged"
        );

        let start = Instant::now();
        let mut iterations = 0;

        loop {
            let output = network.feed_forward(x)?;
            let loss = self.loss_fn.loss(output, y);
            let elapsed = start.elapsed();

            if loss <= self.max_loss {
                info!("converged after {iterations} iterations in {elapsed:.2?}, loss {loss}");
                return Ok(TrainingReport {
                    iterations,
                    elapsed,
                    final_loss: loss,
                });
            }

            let out_of_time = self.max_duration.is_some_and(|max| elapsed >= max);
            if iterations >= self.max_iterations || out_of_time {
                return Err(MlErr::DidNotConverge {
                    iterations,
                    loss,
                    elapsed,
                });
            }

            if self.log_every > 0 && iterations % self.log_every == 0 {
                debug!(iteration = iterations, loss = loss; "training");
            }

            network.back_propagate(x, y, &self.loss_fn)?;
            iterations += 1;
        }
    }
}
