//! Dynamic weight derivation for the composite score.
//!
//! Attribute weights are the configured base split scaled by the
//! model's relative feature importance and by how much the attribute
//! actually varies across the current roster. Caller-supplied explicit
//! weights replace the dynamic ones entirely; there is no blending.

use medirank_common::{config::ScoringConfig, DoctorRecord, WeightBreakdown};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Relative importance of the three ranked attributes, normalized to
/// sum to 1. Sourced from the classifier when one is available,
/// uniform otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeImportance {
    pub experience: f64,
    pub rating: f64,
    pub patients_treated: f64,
}

impl AttributeImportance {
    pub fn uniform() -> Self {
        Self {
            experience: 1.0 / 3.0,
            rating: 1.0 / 3.0,
            patients_treated: 1.0 / 3.0,
        }
    }

    /// Take the importances of the numeric feature columns
    /// (experience, rating, patients_treated — fee is deliberately
    /// excluded from the ranking signal) and renormalize.
    pub fn from_feature_importances(importances: ArrayView1<'_, f64>) -> Self {
        if importances.len() < 3 {
            return Self::uniform();
        }
        let mut out = Self {
            experience: importances[0].abs(),
            rating: importances[1].abs(),
            patients_treated: importances[2].abs(),
        };
        out.normalise();
        out
    }

    fn normalise(&mut self) {
        let sum = self.experience + self.rating + self.patients_treated;
        if sum > 0.0 {
            self.experience /= sum;
            self.rating /= sum;
            self.patients_treated /= sum;
        } else {
            *self = Self::uniform();
        }
    }
}

/// Spread of the ranked attributes over the current roster, normalized
/// to sum to 1. A roster where everyone has the same rating gives
/// rating no discriminating power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeVariability {
    pub experience: f64,
    pub rating: f64,
    pub patients_treated: f64,
}

impl AttributeVariability {
    pub fn from_roster(doctors: &[DoctorRecord]) -> Self {
        let mut out = Self {
            experience: std_dev(doctors.iter().map(|d| d.experience_years as f64)),
            rating: std_dev(doctors.iter().map(|d| d.rating)),
            patients_treated: std_dev(doctors.iter().map(|d| d.patients_treated as f64)),
        };
        let sum = out.experience + out.rating + out.patients_treated;
        if sum > 0.0 {
            out.experience /= sum;
            out.rating /= sum;
            out.patients_treated /= sum;
        }
        out
    }
}

fn std_dev(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Fee spread over the roster, for the min-max fee contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRange {
    pub min: f64,
    pub max: f64,
}

impl FeeRange {
    pub fn from_roster(doctors: &[DoctorRecord]) -> Self {
        let fees = doctors.iter().map(|d| d.consultation_fee as f64);
        let min = fees.clone().fold(f64::INFINITY, f64::min);
        let max = fees.fold(f64::NEG_INFINITY, f64::max);
        Self { min, max }
    }

    /// 1.0 for the cheapest doctor, 0.0 for the most expensive,
    /// 0.5 when every fee is the same.
    pub fn cheapness(&self, fee: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span.abs() < 1e-12 {
            return 0.5;
        }
        (1.0 - (fee - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Min-max-clamped contribution of a raw attribute value against its
/// configured cap: 0 at zero, saturating at the cap.
pub fn capped_contribution(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    (value / cap).clamp(0.0, 1.0)
}

/// Derive the dynamic weight vector: base split × importance ×
/// variability for the ranked attributes, base values as-is for the
/// relevance and specialization terms.
pub fn dynamic_weights(
    cfg: &ScoringConfig,
    importance: &AttributeImportance,
    variability: &AttributeVariability,
) -> WeightBreakdown {
    WeightBreakdown {
        similarity: cfg.similarity,
        specialization: cfg.specialization,
        experience: cfg.experience * importance.experience * variability.experience,
        rating: cfg.rating * importance.rating * variability.rating,
        patients_treated: cfg.patients_treated
            * importance.patients_treated
            * variability.patients_treated,
        fee: cfg.fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirank_test_utils::DoctorBuilder;
    use ndarray::array;

    #[test]
    fn test_importance_normalized() {
        let imp = AttributeImportance::from_feature_importances(array![2.0, 1.0, 1.0].view());
        assert!((imp.experience + imp.rating + imp.patients_treated - 1.0).abs() < 1e-9);
        assert!((imp.experience - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_importance_falls_back_to_uniform() {
        let imp = AttributeImportance::from_feature_importances(array![0.0, 0.0, 0.0].view());
        assert!((imp.experience - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_attribute_has_zero_variability() {
        let doctors = vec![
            DoctorBuilder::new("A").rating(4.0).experience(2).patients(100).build(),
            DoctorBuilder::new("B").rating(4.0).experience(20).patients(900).build(),
        ];
        let var = AttributeVariability::from_roster(&doctors);
        assert_eq!(var.rating, 0.0);
        assert!(var.experience > 0.0);
    }

    #[test]
    fn test_fee_cheapness() {
        let doctors = vec![
            DoctorBuilder::new("A").fee(200).build(),
            DoctorBuilder::new("B").fee(1000).build(),
        ];
        let range = FeeRange::from_roster(&doctors);
        assert!((range.cheapness(200.0) - 1.0).abs() < 1e-9);
        assert!((range.cheapness(1000.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_fee_cheapness_degenerate() {
        let doctors = vec![DoctorBuilder::new("A").fee(500).build()];
        let range = FeeRange::from_roster(&doctors);
        assert_eq!(range.cheapness(500.0), 0.5);
    }

    #[test]
    fn test_capped_contribution_saturates() {
        assert_eq!(capped_contribution(30.0, 15.0), 1.0);
        assert!((capped_contribution(7.5, 15.0) - 0.5).abs() < 1e-9);
        assert_eq!(capped_contribution(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_dynamic_weights_scale_with_variability() {
        let cfg = ScoringConfig::default();
        let imp = AttributeImportance::uniform();
        let flat = AttributeVariability {
            experience: 0.0,
            rating: 0.5,
            patients_treated: 0.5,
        };
        let w = dynamic_weights(&cfg, &imp, &flat);
        assert_eq!(w.experience, 0.0);
        assert!(w.rating > 0.0);
        assert_eq!(w.similarity, cfg.similarity);
    }
}
