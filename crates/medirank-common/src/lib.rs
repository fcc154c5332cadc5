//! medirank-common — Shared types, errors, and configuration used across all Medirank crates.

pub mod config;
pub mod entities;
pub mod error;

// Re-export commonly used types
pub use config::{CapsConfig, RecommenderConfig, ScoringConfig};
pub use entities::{DoctorRecord, GeoPoint, ScoredResult, WeightBreakdown};
pub use error::{RecommendError, Result};
