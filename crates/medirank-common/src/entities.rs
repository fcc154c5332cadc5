/// Core entity types for the doctor directory.
/// These are read-only copies handed to the scoring engine; the
/// persistence layer owns the source of truth.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Origin fallback used when a doctor has no stored coordinates.
    /// Distance against (0,0) is meaningless but defined; callers that
    /// care should check `DoctorRecord::location` first.
    pub fn origin() -> Self {
        Self { latitude: 0.0, longitude: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Doctor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub experience_years: u32,
    /// Patient rating, 0.0–5.0.
    pub rating: f64,
    pub patients_treated: u32,
    pub consultation_fee: u32,
    /// Condition tokens, lower-cased and trimmed at ingest.
    pub conditions_treated: Vec<String>,
    pub location: Option<GeoPoint>,
    pub hospital: Option<String>,
    pub availability: Option<String>,
    pub address: Option<String>,
}

impl DoctorRecord {
    /// Coordinates for distance computation, substituting the origin
    /// when none are stored.
    pub fn location_or_origin(&self) -> GeoPoint {
        self.location.unwrap_or_else(GeoPoint::origin)
    }
}

// ---------------------------------------------------------------------------
// Scored result
// ---------------------------------------------------------------------------

/// Per-feature weights actually applied to one result.
/// Mirrors the composite-score terms so callers can inspect the blend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub similarity: f64,
    pub specialization: f64,
    pub experience: f64,
    pub rating: f64,
    pub patients_treated: f64,
    pub fee: f64,
}

impl WeightBreakdown {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.similarity,
            self.specialization,
            self.experience,
            self.rating,
            self.patients_treated,
            self.fee,
        ]
    }
}

/// A doctor paired with its per-query scores. Created per request,
/// never cached across queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doctor: DoctorRecord,
    /// Relevance in [0, 1] that this doctor treats the queried condition.
    pub similarity_score: f64,
    /// Weighted blend used for the final ordering.
    pub composite_score: f64,
    /// Condition tokens containing the query text.
    pub matched_conditions: Vec<String>,
    /// Great-circle distance from the caller, when a location was given.
    /// Computed against (0,0) for doctors without stored coordinates.
    pub distance_km: Option<f64>,
    pub weight_components: WeightBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_or_origin_fallback() {
        let doc = DoctorRecord {
            id: Uuid::new_v4(),
            name: "Dr. Rao".to_string(),
            specialization: "Cardiology".to_string(),
            experience_years: 10,
            rating: 4.2,
            patients_treated: 300,
            consultation_fee: 600,
            conditions_treated: vec!["hypertension".to_string()],
            location: None,
            hospital: None,
            availability: None,
            address: None,
        };
        assert_eq!(doc.location_or_origin(), GeoPoint::origin());
    }
}
