//! RKT PBPH achievement-category prediction service.
//!
//! Loads a pre-trained classifier once at startup and serves single-row
//! predictions over HTTP:
//!
//! - `POST /predict` validates a feature body and returns
//!   `{"Kategori": <class>, "Capaian": <label>}`
//! - `GET /health` reports whether a model is loaded
//! - `GET /metrics` exposes Prometheus metrics

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;

pub use error::{AppError, Result};
