use ingest::{AXES, Bias, Dataset};
use ndarray::Array2;

use crate::{MlErr, Result};

/// A dataset turned into network inputs and targets.
#[derive(Debug, Clone)]
pub struct Features {
    /// One scaled acceleration vector per row.
    pub x: Array2<f32>,
    /// One scaled label per row, in `[0, 1]`.
    pub y: Array2<f32>,
    /// The value every element of `x` was divided by.
    pub scale: f32,
}

/// Scales parsed records for the classifier.
///
/// The whole feature matrix is divided by its single global maximum, not by a per-column
/// maximum. Persisted weights are only meaningful for inputs scaled exactly this way.
#[derive(Debug, Clone)]
pub struct Normalizer {
    classes: usize,
    bias: Option<Bias>,
}

impl Normalizer {
    /// Creates a new `Normalizer`.
    ///
    /// # Arguments
    /// * `classes` - The amount of classes, label codes are divided by `classes - 1`.
    pub fn new(classes: usize) -> Self {
        Self {
            classes,
            bias: None,
        }
    }

    /// Subtracts `bias` from every axis value before scaling.
    pub fn with_bias(mut self, bias: Bias) -> Self {
        self.bias = Some(bias);
        self
    }

    /// Builds the feature matrix and the label vector of `dataset`.
    ///
    /// # Returns
    /// The features, or `DegenerateInput` if the dataset is empty, its maximum is exactly
    /// zero or there are less than two classes to spread the labels over.
    pub fn normalize(&self, dataset: &Dataset) -> Result<Features> {
        if dataset.is_empty() || dataset.width() == 0 {
            return Err(MlErr::DegenerateInput("there are no features to scale"));
        }

        if self.classes < 2 {
            return Err(MlErr::DegenerateInput(
                "at least two classes are needed to scale the labels",
            ));
        }

        let shape = (dataset.len(), dataset.width());
        let values = dataset
            .iter()
            .flat_map(|record| record.acceleration())
            .copied()
            .collect();

        let mut x = Array2::from_shape_vec(shape, values).map_err(|_| MlErr::ShapeMismatch {
            what: "features",
            got: (dataset.len(), 0),
            expected: shape,
        })?;

        if let Some(bias) = self.bias {
            let bias = bias.as_array();
            for mut row in x.rows_mut() {
                for (j, value) in row.iter_mut().enumerate() {
                    *value -= bias[j % AXES];
                }
            }
        }

        let scale = x.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if scale == 0.0 {
            return Err(MlErr::DegenerateInput("the maximum of the features is zero"));
        }

        x.mapv_inplace(|value| value / scale);

        let top = (self.classes - 1) as f32;
        let labels: Vec<_> = dataset.iter().map(|r| r.label() as f32 / top).collect();
        let y = Array2::from_shape_vec((labels.len(), 1), labels).map_err(|_| {
            MlErr::ShapeMismatch {
                what: "labels",
                got: (0, 1),
                expected: (dataset.len(), 1),
            }
        })?;

        Ok(Features { x, y, scale })
    }
}
