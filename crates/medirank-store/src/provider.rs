//! Doctor table access.
//!
//! The scoring core never writes to the directory; it pulls a
//! point-in-time copy of all doctors whenever it refits. Implementations
//! can back this with any persistence layer.

use async_trait::async_trait;
use medirank_common::{DoctorRecord, Result};

/// Read-only supplier of the current doctor table.
#[async_trait]
pub trait DoctorProvider: Send + Sync {
    /// All doctors, as a point-in-time copy.
    async fn all_doctors(&self) -> Result<Vec<DoctorRecord>>;
}

// ── Mock implementation for testing ─────────────────────────────────────────

/// In-memory provider with a fixed roster.
#[derive(Default)]
pub struct MockDoctorProvider {
    doctors: Vec<DoctorRecord>,
}

impl MockDoctorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, doctor: DoctorRecord) -> Self {
        self.doctors.push(doctor);
        self
    }

    pub fn with_all(mut self, doctors: Vec<DoctorRecord>) -> Self {
        self.doctors.extend(doctors);
        self
    }
}

#[async_trait]
impl DoctorProvider for MockDoctorProvider {
    async fn all_doctors(&self) -> Result<Vec<DoctorRecord>> {
        Ok(self.doctors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirank_test_utils::doctor;

    #[tokio::test]
    async fn test_mock_provider_returns_roster() {
        let provider = MockDoctorProvider::new()
            .with(doctor("A", "Cardiology", &["hypertension"]))
            .with(doctor("B", "Neurology", &["migraine"]));

        let doctors = provider.all_doctors().await.unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].name, "A");
    }

    #[tokio::test]
    async fn test_empty_mock_provider() {
        let provider = MockDoctorProvider::new();
        assert!(provider.all_doctors().await.unwrap().is_empty());
    }
}
