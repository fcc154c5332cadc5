//! Feature construction for the doctor table.
//!
//! One row per doctor: z-scored numerics, one-hot specialization,
//! multi-hot condition vocabulary. The scaling statistics are refit on
//! every dataset change; there is no separate train/serve statistic.

use medirank_common::{DoctorRecord, RecommendError, Result};
use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Order of the scaled numeric columns.
pub const NUMERIC_COLUMNS: [&str; 4] = ["experience", "rating", "patients_treated", "fee"];

/// Split comma-separated entries into trimmed, lower-cased tokens.
/// Empty input yields an empty set; duplicates keep first occurrence.
pub fn normalize_conditions(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in raw {
        for token in entry.split(',') {
            let token = token.trim().to_lowercase();
            if !token.is_empty() && !out.contains(&token) {
                out.push(token);
            }
        }
    }
    out
}

// ── Scaler ───────────────────────────────────────────────────────────────────

/// Per-column fit statistics for z-scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self { mean, std: var.sqrt() }
    }

    /// Zero-variance columns scale to 0.0 rather than dividing by zero.
    pub fn scale(&self, value: f64) -> f64 {
        if self.std < 1e-12 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

// ── Vocabulary ───────────────────────────────────────────────────────────────

/// The fitted encoder state: ordered categorical vocabularies plus the
/// numeric scaling statistics. Versioned with the snapshot that owns
/// it; an unseen label at query time is a defined miss, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVocabulary {
    /// Distinct condition tokens seen at fit time, sorted.
    pub conditions: Vec<String>,
    /// Distinct specializations seen at fit time, sorted.
    pub specializations: Vec<String>,
    /// Stats for the `NUMERIC_COLUMNS`, in order.
    pub numeric_stats: Vec<ColumnStats>,
}

impl FeatureVocabulary {
    pub fn condition_index(&self, label: &str) -> Option<usize> {
        self.conditions.iter().position(|c| c == label)
    }

    pub fn specialization_index(&self, spec: &str) -> Option<usize> {
        let spec = spec.to_lowercase();
        self.specializations.iter().position(|s| *s == spec)
    }

    pub fn n_features(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.specializations.len() + self.conditions.len()
    }

    /// Column offset of the multi-hot condition block.
    pub fn condition_offset(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.specializations.len()
    }
}

// ── Fitted features ──────────────────────────────────────────────────────────

/// Feature matrix plus the encoders it was built with. Ephemeral:
/// rebuilt whenever the doctor set changes, never the source of truth.
#[derive(Debug, Clone)]
pub struct FittedFeatures {
    pub vocabulary: FeatureVocabulary,
    /// One row per doctor, `vocabulary.n_features()` columns.
    pub matrix: Array2<f64>,
    /// Normalized condition tokens per doctor, row-aligned.
    pub conditions_by_doctor: Vec<Vec<String>>,
}

impl FittedFeatures {
    /// The multi-hot condition columns, used as training targets.
    pub fn condition_block(&self) -> ArrayView2<'_, f64> {
        let off = self.vocabulary.condition_offset();
        self.matrix.slice(s![.., off..])
    }
}

/// Fit encoders over the doctor set and build the feature matrix.
pub fn fit(doctors: &[DoctorRecord]) -> Result<FittedFeatures> {
    if doctors.is_empty() {
        return Err(RecommendError::EmptyDataset);
    }

    let conditions_by_doctor: Vec<Vec<String>> = doctors
        .iter()
        .map(|d| normalize_conditions(&d.conditions_treated))
        .collect();

    let mut conditions: Vec<String> = conditions_by_doctor
        .iter()
        .flatten()
        .cloned()
        .collect();
    conditions.sort();
    conditions.dedup();

    let mut specializations: Vec<String> = doctors
        .iter()
        .map(|d| d.specialization.trim().to_lowercase())
        .collect();
    specializations.sort();
    specializations.dedup();

    let numeric_rows: Vec<[f64; 4]> = doctors
        .iter()
        .map(|d| {
            [
                d.experience_years as f64,
                d.rating,
                d.patients_treated as f64,
                d.consultation_fee as f64,
            ]
        })
        .collect();

    let numeric_stats: Vec<ColumnStats> = (0..NUMERIC_COLUMNS.len())
        .map(|col| {
            let column: Vec<f64> = numeric_rows.iter().map(|row| row[col]).collect();
            ColumnStats::fit(&column)
        })
        .collect();

    let vocabulary = FeatureVocabulary {
        conditions,
        specializations,
        numeric_stats,
    };

    let matrix = build_matrix(doctors, &conditions_by_doctor, &vocabulary);

    tracing::debug!(
        doctors = doctors.len(),
        features = vocabulary.n_features(),
        conditions = vocabulary.conditions.len(),
        "feature matrix built"
    );

    Ok(FittedFeatures {
        vocabulary,
        matrix,
        conditions_by_doctor,
    })
}

/// Transform a doctor table through already-fitted encoders. Condition
/// or specialization values outside the vocabulary contribute nothing.
pub fn build_matrix(
    doctors: &[DoctorRecord],
    conditions_by_doctor: &[Vec<String>],
    vocabulary: &FeatureVocabulary,
) -> Array2<f64> {
    let n_spec = vocabulary.specializations.len();
    let mut matrix = Array2::<f64>::zeros((doctors.len(), vocabulary.n_features()));

    for (i, doctor) in doctors.iter().enumerate() {
        matrix[[i, 0]] = vocabulary.numeric_stats[0].scale(doctor.experience_years as f64);
        matrix[[i, 1]] = vocabulary.numeric_stats[1].scale(doctor.rating);
        matrix[[i, 2]] = vocabulary.numeric_stats[2].scale(doctor.patients_treated as f64);
        matrix[[i, 3]] = vocabulary.numeric_stats[3].scale(doctor.consultation_fee as f64);

        if let Some(j) = vocabulary.specialization_index(doctor.specialization.trim()) {
            matrix[[i, NUMERIC_COLUMNS.len() + j]] = 1.0;
        }

        for token in &conditions_by_doctor[i] {
            if let Some(j) = vocabulary.condition_index(token) {
                matrix[[i, NUMERIC_COLUMNS.len() + n_spec + j]] = 1.0;
            }
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirank_test_utils::{doctor, DoctorBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_conditions_splits_and_lowercases() {
        let raw = vec!["Diabetes, Thyroid Disorder".to_string(), " OBESITY ".to_string()];
        assert_eq!(
            normalize_conditions(&raw),
            vec!["diabetes", "thyroid disorder", "obesity"]
        );
    }

    #[test]
    fn test_normalize_conditions_empty_and_dupes() {
        assert!(normalize_conditions(&[]).is_empty());
        let raw = vec!["flu,flu, ,".to_string()];
        assert_eq!(normalize_conditions(&raw), vec!["flu"]);
    }

    #[test]
    fn test_fit_empty_set_is_error() {
        assert!(matches!(fit(&[]), Err(RecommendError::EmptyDataset)));
    }

    #[test]
    fn test_matrix_shape_and_hot_columns() {
        let doctors = vec![
            doctor("A", "Endocrinology", &["diabetes"]),
            doctor("B", "Cardiology", &["hypertension", "diabetes"]),
        ];
        let fitted = fit(&doctors).unwrap();
        let vocab = &fitted.vocabulary;

        assert_eq!(vocab.conditions, vec!["diabetes", "hypertension"]);
        assert_eq!(vocab.specializations, vec!["cardiology", "endocrinology"]);
        assert_eq!(fitted.matrix.dim(), (2, 4 + 2 + 2));

        let off = vocab.condition_offset();
        let diabetes = vocab.condition_index("diabetes").unwrap();
        assert_eq!(fitted.matrix[[0, off + diabetes]], 1.0);
        assert_eq!(fitted.matrix[[1, off + diabetes]], 1.0);
        let hyper = vocab.condition_index("hypertension").unwrap();
        assert_eq!(fitted.matrix[[0, off + hyper]], 0.0);
        assert_eq!(fitted.matrix[[1, off + hyper]], 1.0);
    }

    #[test]
    fn test_zero_variance_column_scales_to_zero() {
        let doctors = vec![
            DoctorBuilder::new("A").rating(4.0).build(),
            DoctorBuilder::new("B").rating(4.0).build(),
        ];
        let fitted = fit(&doctors).unwrap();
        // rating column is index 1
        assert_eq!(fitted.matrix[[0, 1]], 0.0);
        assert_eq!(fitted.matrix[[1, 1]], 0.0);
    }

    #[test]
    fn test_scaled_numerics_zero_mean() {
        let doctors = vec![
            DoctorBuilder::new("A").experience(2).build(),
            DoctorBuilder::new("B").experience(10).build(),
            DoctorBuilder::new("C").experience(18).build(),
        ];
        let fitted = fit(&doctors).unwrap();
        let col_sum: f64 = (0..3).map(|i| fitted.matrix[[i, 0]]).sum();
        assert!(col_sum.abs() < 1e-9);
    }
}
