/// Amount of axes per acceleration tuple.
pub const AXES: usize = 3;

/// Amount of time sub-samples per frame.
pub const SUB_SAMPLES: usize = 3;

/// Amount of values a noise frame carries.
pub const CALIBRATION_WIDTH: usize = AXES * SUB_SAMPLES;

/// Per-axis average sensor offset, estimated from noise frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bias {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Bias {
    /// Returns the bias as an `[x, y, z]` array.
    pub fn as_array(&self) -> [f32; AXES] {
        [self.x, self.y, self.z]
    }
}

/// Accumulates the acceleration of every noise frame seen during a parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationAccumulator {
    sum: [f32; AXES],
    frames: usize,
}

impl CalibrationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a noise frame.
    ///
    /// # Arguments
    /// * `samples` - The frame's values, `x, y, z` for each of the sub-samples.
    pub(crate) fn add_frame(&mut self, samples: &[f32]) {
        debug_assert_eq!(samples.len(), CALIBRATION_WIDTH);

        for (axis, sum) in self.sum.iter_mut().enumerate() {
            *sum += (0..SUB_SAMPLES)
                .map(|sub| samples[axis + sub * AXES])
                .sum::<f32>();
        }

        self.frames += 1;
    }

    /// The amount of noise frames accumulated so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Averages the accumulated sums into a bias estimate.
    ///
    /// # Returns
    /// The bias, or `None` if no noise frame was accumulated.
    pub fn finalize(&self) -> Option<Bias> {
        if self.frames == 0 {
            return None;
        }

        let divisor = (SUB_SAMPLES * self.frames) as f32;
        let [x, y, z] = self.sum.map(|sum| sum / divisor);
        Some(Bias { x, y, z })
    }
}
