/// The logistic activation function.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f32) -> f32 {
        1. / (1. + (-z).exp())
    }

    /// The derivative of the sigmoid expressed in terms of its output, that is, `a` must
    /// already be an activated value.
    pub fn df(&self, a: f32) -> f32 {
        a * (1. - a)
    }
}
