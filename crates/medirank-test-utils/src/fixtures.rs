//! Canned doctor records for unit tests.

use medirank_common::{DoctorRecord, GeoPoint};
use uuid::Uuid;

/// Builder for a single test doctor. Defaults are a plausible
/// mid-career generalist; override what the test cares about.
pub struct DoctorBuilder {
    record: DoctorRecord,
}

impl DoctorBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            record: DoctorRecord {
                id: Uuid::new_v4(),
                name: name.to_string(),
                specialization: "General Medicine".to_string(),
                experience_years: 8,
                rating: 4.0,
                patients_treated: 400,
                consultation_fee: 500,
                conditions_treated: vec![],
                location: None,
                hospital: None,
                availability: None,
                address: None,
            },
        }
    }

    pub fn specialization(mut self, s: &str) -> Self {
        self.record.specialization = s.to_string();
        self
    }

    pub fn experience(mut self, years: u32) -> Self {
        self.record.experience_years = years;
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.record.rating = rating;
        self
    }

    pub fn patients(mut self, n: u32) -> Self {
        self.record.patients_treated = n;
        self
    }

    pub fn fee(mut self, fee: u32) -> Self {
        self.record.consultation_fee = fee;
        self
    }

    pub fn conditions(mut self, conditions: &[&str]) -> Self {
        self.record.conditions_treated =
            conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn location(mut self, lat: f64, lon: f64) -> Self {
        self.record.location = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn build(self) -> DoctorRecord {
        self.record
    }
}

/// Shorthand for a doctor with the fields scoring cares about.
pub fn doctor(name: &str, specialization: &str, conditions: &[&str]) -> DoctorRecord {
    DoctorBuilder::new(name)
        .specialization(specialization)
        .conditions(conditions)
        .build()
}

/// A small roster spanning several specializations and conditions,
/// enough for the classifier to have more than one label.
pub fn sample_roster() -> Vec<DoctorRecord> {
    vec![
        DoctorBuilder::new("Dr. Sharma")
            .specialization("Endocrinology")
            .experience(15)
            .rating(4.6)
            .patients(900)
            .fee(800)
            .conditions(&["diabetes", "thyroid disorder"])
            .location(19.076, 72.8777)
            .build(),
        DoctorBuilder::new("Dr. Iyer")
            .specialization("Endocrinology")
            .experience(4)
            .rating(4.9)
            .patients(150)
            .fee(400)
            .conditions(&["diabetes", "obesity"])
            .location(13.0827, 80.2707)
            .build(),
        DoctorBuilder::new("Dr. Khan")
            .specialization("Cardiology")
            .experience(12)
            .rating(4.3)
            .patients(700)
            .fee(1000)
            .conditions(&["hypertension", "arrhythmia"])
            .location(28.7041, 77.1025)
            .build(),
        DoctorBuilder::new("Dr. Mehta")
            .specialization("Dermatology")
            .experience(7)
            .rating(3.9)
            .patients(350)
            .fee(300)
            .conditions(&["eczema", "psoriasis"])
            .build(),
        DoctorBuilder::new("Dr. Bose")
            .specialization("General Medicine")
            .experience(20)
            .rating(4.1)
            .patients(1200)
            .fee(250)
            .conditions(&["fever", "migraine", "hypertension"])
            .location(22.5726, 88.3639)
            .build(),
    ]
}
