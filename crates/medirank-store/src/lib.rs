//! medirank-store — external collaborators of the scoring core:
//! the persistence-layer contract for the doctor table and the local
//! model-artifact store.

pub mod artifact;
pub mod provider;

pub use artifact::ArtifactStore;
pub use provider::{DoctorProvider, MockDoctorProvider};
