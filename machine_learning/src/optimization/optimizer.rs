use ndarray::{ArrayView2, ArrayViewMut2};

pub trait Optimizer {
    fn update_params(&mut self, params: ArrayViewMut2<f32>, grad: ArrayView2<f32>);
}
