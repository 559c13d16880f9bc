pub mod extract;
pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::PredictionService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictionService>,
}

impl AppState {
    pub fn new(predictor: Arc<PredictionService>) -> Self {
        Self { predictor }
    }
}
