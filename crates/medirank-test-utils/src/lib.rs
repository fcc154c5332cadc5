//! medirank-test-utils — doctor fixtures shared across workspace tests.

pub mod fixtures;

pub use fixtures::{doctor, sample_roster, DoctorBuilder};
