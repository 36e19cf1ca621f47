extern crate serde;

pub mod dataset;
pub mod encoder;
pub mod error;
pub mod input;
pub mod model;
pub mod monitor;
pub mod recommend;
pub mod records;

pub use error::{DonorError, Result};

/// Where the trainer writes the model and the predictor reads it.
pub static MODEL_PATH: &str = "ml/model.bin";
