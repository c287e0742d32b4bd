//! Clients for services this backend consumes

pub mod prediction_client;

pub use prediction_client::{PredictionClient, PredictorHealth};
