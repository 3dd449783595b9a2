use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;

use super::{activations::Sigmoid, loss::LossFn};
use crate::{
    MlErr, Result,
    optimization::{GradientDescent, Optimizer},
};

/// The network produces a single scalar in `[0, 1]` per sample.
pub const OUTPUT_SIZE: usize = 1;

/// The layer sizes of a `Network`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl Shape {
    pub fn new(input: usize, hidden: usize) -> Self {
        Self {
            input,
            hidden,
            output: OUTPUT_SIZE,
        }
    }

    /// The dimensions of the input to hidden weight matrix.
    pub fn w1(&self) -> (usize, usize) {
        (self.input, self.hidden)
    }

    /// The dimensions of the hidden to output weight matrix.
    pub fn w2(&self) -> (usize, usize) {
        (self.hidden, self.output)
    }
}

/// A two layer feed-forward network with sigmoid activations and no biases.
///
/// The activations of the last forward pass are kept around since the backward pass needs
/// them, so `back_propagate` must follow a `feed_forward` over the same input.
#[derive(Clone, Debug)]
pub struct Network {
    w1: Array2<f32>,
    w2: Array2<f32>,
    act_fn: Sigmoid,
    optimizer: GradientDescent,

    // Forward metadata
    hidden: Array2<f32>,
    output: Array2<f32>,
}

impl Network {
    /// Creates a new `Network` with weights drawn from a standard normal distribution.
    ///
    /// # Arguments
    /// * `shape` - The layer sizes.
    /// * `rng` - A random number generator.
    pub fn new<R: Rng>(shape: Shape, rng: &mut R) -> Self {
        let w1 = Array2::from_shape_simple_fn(shape.w1(), || rng.sample(StandardNormal));
        let w2 = Array2::from_shape_simple_fn(shape.w2(), || rng.sample(StandardNormal));
        Self::assemble(w1, w2)
    }

    /// Creates a new `Network` from existing weights.
    ///
    /// # Arguments
    /// * `shape` - The layer sizes the weights must agree with.
    /// * `w1` - The input to hidden weights.
    /// * `w2` - The hidden to output weights.
    ///
    /// # Returns
    /// The network or a `ShapeMismatch` naming the offending matrix.
    pub fn from_weights(shape: Shape, w1: Array2<f32>, w2: Array2<f32>) -> Result<Self> {
        check_dim("W1", w1.dim(), shape.w1())?;
        check_dim("W2", w2.dim(), shape.w2())?;
        Ok(Self::assemble(w1, w2))
    }

    fn assemble(w1: Array2<f32>, w2: Array2<f32>) -> Self {
        Self {
            w1,
            w2,
            act_fn: Sigmoid::new(),
            optimizer: GradientDescent::default(),
            hidden: Array2::zeros((0, 0)),
            output: Array2::zeros((0, 0)),
        }
    }

    /// Scales every weight update by `learning_rate`, `1.0` by default.
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.optimizer = GradientDescent::new(learning_rate);
        self
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.w1.nrows(), self.w1.ncols())
    }

    pub fn w1(&self) -> ArrayView2<'_, f32> {
        self.w1.view()
    }

    pub fn w2(&self) -> ArrayView2<'_, f32> {
        self.w2.view()
    }

    /// Makes a forward pass through the network, retaining the activations.
    ///
    /// # Arguments
    /// * `x` - The input, one sample per row.
    ///
    /// # Returns
    /// The output activations, one row per sample.
    pub fn feed_forward(&mut self, x: ArrayView2<f32>) -> Result<ArrayView2<'_, f32>> {
        let (hidden, output) = self.forward(x)?;
        self.hidden = hidden;
        self.output = output;
        Ok(self.output.view())
    }

    /// Makes a forward pass through the network without touching its state.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (_, output) = self.forward(x)?;
        Ok(output)
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>)> {
        check_dim("X", x.dim(), (x.nrows(), self.w1.nrows()))?;

        let act_fn = self.act_fn;
        let hidden = x.dot(&self.w1).mapv_into(|z| act_fn.f(z));
        let output = hidden.dot(&self.w2).mapv_into(|z| act_fn.f(z));
        Ok((hidden, output))
    }

    /// Propagates the error of the last forward pass back through the network and updates
    /// both weight matrices in place.
    ///
    /// # Arguments
    /// * `x` - The input the last `feed_forward` was made with.
    /// * `y` - The expected output, one row per sample.
    /// * `loss_fn` - The loss whose derivative drives the update.
    pub fn back_propagate<L: LossFn>(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        loss_fn: &L,
    ) -> Result<()> {
        check_dim("hidden activations", self.hidden.dim(), (x.nrows(), self.w1.ncols()))?;
        check_dim("y", y.dim(), self.output.dim())?;

        let act_fn = self.act_fn;

        let mut output_delta = loss_fn.loss_prime(self.output.view(), y);
        output_delta.zip_mut_with(&self.output, |d, &a| *d *= act_fn.df(a));

        let mut hidden_delta = output_delta.dot(&self.w2.t());
        hidden_delta.zip_mut_with(&self.hidden, |d, &a| *d *= act_fn.df(a));

        let dw1 = x.t().dot(&hidden_delta);
        let dw2 = self.hidden.t().dot(&output_delta);

        self.optimizer.update_params(self.w1.view_mut(), dw1.view());
        self.optimizer.update_params(self.w2.view_mut(), dw2.view());
        Ok(())
    }

    /// A single full-batch step: one forward and one backward pass over every sample.
    pub fn train_step<L: LossFn>(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        loss_fn: &L,
    ) -> Result<()> {
        self.feed_forward(x)?;
        self.back_propagate(x, y, loss_fn)
    }
}

fn check_dim(what: &'static str, got: (usize, usize), expected: (usize, usize)) -> Result<()> {
    if got != expected {
        return Err(MlErr::ShapeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
