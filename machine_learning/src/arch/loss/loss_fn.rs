use ndarray::{Array2, ArrayView2};

/// A measure of how far the network output is from the expected labels.
pub trait LossFn {
    /// The loss over a whole batch, one row per sample.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// The derivative of the loss with respect to each output, same shape as `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
