use ndarray::{ArrayView2, ArrayViewMut2};

use super::Optimizer;

/// Plain full-batch gradient descent, `w -= learning_rate * g`.
#[derive(Clone, Copy, Debug)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// # Arguments
    /// * `learning_rate` - Scales every gradient before it is subtracted.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Default for GradientDescent {
    /// A unit learning rate, the raw gradient is the step.
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Optimizer for GradientDescent {
    /// Moves every weight of `params` against its entry in `grad`.
    fn update_params(&mut self, mut params: ArrayViewMut2<f32>, grad: ArrayView2<f32>) {
        let lr = self.learning_rate;
        params.zip_mut_with(&grad, |w, &g| *w -= lr * g);
    }
}
