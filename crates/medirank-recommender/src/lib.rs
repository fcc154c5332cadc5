//! medirank-recommender — Doctor recommendation scoring engine.
//!
//! Single-pass pipeline per request: condition matching → composite
//! scoring → pagination, run against an immutable fitted snapshot.
//! Snapshots are rebuilt out-of-band whenever the doctor set changes.

pub mod engine;
pub mod features;
pub mod geo;
pub mod model;
pub mod paginate;
pub mod scorer;
pub mod snapshot;
pub mod strategy;
pub mod weights;

pub use engine::{NearestDoctor, RecommendRequest, Recommender};
pub use snapshot::{ModelSnapshot, SnapshotArtifact};
pub use strategy::ScoringStrategy;
