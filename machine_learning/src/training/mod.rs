mod trainer;

pub use trainer::{ConvergenceTrainer, DEFAULT_LOG_EVERY, DEFAULT_MAX_ITERATIONS, TrainingReport};
