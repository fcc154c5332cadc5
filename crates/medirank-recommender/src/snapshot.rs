//! Fitted model snapshots.
//!
//! A snapshot bundles everything a scoring request reads: the doctor
//! table copy, fitted encoders, feature matrix, optional classifier,
//! and the chosen strategy. Snapshots are immutable once built; a
//! refit produces a new one and the engine swaps the pointer.

use chrono::{DateTime, Utc};
use medirank_common::{DoctorRecord, RecommenderConfig, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::features::{self, FeatureVocabulary, FittedFeatures};
use crate::model::ConditionClassifier;
use crate::strategy::ScoringStrategy;
use crate::weights::{AttributeImportance, AttributeVariability, FeeRange};

/// An immutable, versioned bundle of fitted state.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub version: Uuid,
    pub fitted_at: DateTime<Utc>,
    /// Digest of the doctor table this snapshot was fit on.
    pub fingerprint: String,
    pub doctors: Vec<DoctorRecord>,
    pub features: FittedFeatures,
    pub classifier: Option<ConditionClassifier>,
    pub strategy: ScoringStrategy,
    pub importance: AttributeImportance,
    pub variability: AttributeVariability,
    pub fee_range: FeeRange,
}

impl ModelSnapshot {
    /// Fit encoders and classifier over the doctor set. Training
    /// failure is not fatal: the snapshot is built with the keyword
    /// strategy instead.
    pub fn fit(doctors: Vec<DoctorRecord>, config: &RecommenderConfig) -> Result<Self> {
        let fingerprint = roster_fingerprint(&doctors)?;
        let features = features::fit(&doctors)?;

        let classifier = if features.vocabulary.conditions.is_empty() {
            warn!("no condition labels in roster, skipping classifier training");
            None
        } else {
            match ConditionClassifier::train(
                features.matrix.view(),
                features.condition_block(),
                &config.training,
            ) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!(error = %e, "classifier training failed, keyword strategy selected");
                    None
                }
            }
        };

        let strategy = if classifier.is_some() {
            ScoringStrategy::ModelBased
        } else {
            ScoringStrategy::KeywordBased
        };

        let importance = classifier
            .as_ref()
            .map(|m| AttributeImportance::from_feature_importances(m.feature_importances().view()))
            .unwrap_or_else(AttributeImportance::uniform);

        let snapshot = Self {
            version: Uuid::new_v4(),
            fitted_at: Utc::now(),
            fingerprint,
            variability: AttributeVariability::from_roster(&doctors),
            fee_range: FeeRange::from_roster(&doctors),
            doctors,
            features,
            classifier,
            strategy,
            importance,
        };

        info!(
            version = %snapshot.version,
            doctors = snapshot.doctors.len(),
            strategy = ?snapshot.strategy,
            "model snapshot fitted"
        );
        Ok(snapshot)
    }

    /// Snapshot over an empty roster. Every query against it returns
    /// an empty result list rather than an error.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            version: Uuid::new_v4(),
            fitted_at: Utc::now(),
            fingerprint: roster_fingerprint(&[])?,
            doctors: vec![],
            features: FittedFeatures {
                vocabulary: FeatureVocabulary {
                    conditions: vec![],
                    specializations: vec![],
                    numeric_stats: vec![],
                },
                matrix: ndarray::Array2::zeros((0, 0)),
                conditions_by_doctor: vec![],
            },
            classifier: None,
            strategy: ScoringStrategy::KeywordBased,
            importance: AttributeImportance::uniform(),
            variability: AttributeVariability::from_roster(&[]),
            fee_range: FeeRange::from_roster(&[]),
        })
    }

    /// Serializable form for the artifact store. The feature matrix is
    /// left out; it is a deterministic transform of the doctors and
    /// vocabulary and is rebuilt on load.
    pub fn to_artifact(&self) -> SnapshotArtifact {
        SnapshotArtifact {
            version: self.version,
            fitted_at: self.fitted_at,
            fingerprint: self.fingerprint.clone(),
            doctors: self.doctors.clone(),
            vocabulary: self.features.vocabulary.clone(),
            classifier: self.classifier.clone(),
            strategy: self.strategy,
        }
    }

    /// Rehydrate a snapshot from a stored artifact.
    pub fn from_artifact(artifact: SnapshotArtifact) -> Result<Self> {
        let conditions_by_doctor: Vec<Vec<String>> = artifact
            .doctors
            .iter()
            .map(|d| features::normalize_conditions(&d.conditions_treated))
            .collect();
        let matrix =
            features::build_matrix(&artifact.doctors, &conditions_by_doctor, &artifact.vocabulary);

        let importance = artifact
            .classifier
            .as_ref()
            .map(|m| AttributeImportance::from_feature_importances(m.feature_importances().view()))
            .unwrap_or_else(AttributeImportance::uniform);

        Ok(Self {
            version: artifact.version,
            fitted_at: artifact.fitted_at,
            fingerprint: artifact.fingerprint,
            variability: AttributeVariability::from_roster(&artifact.doctors),
            fee_range: FeeRange::from_roster(&artifact.doctors),
            features: FittedFeatures {
                vocabulary: artifact.vocabulary,
                matrix,
                conditions_by_doctor,
            },
            doctors: artifact.doctors,
            classifier: artifact.classifier,
            strategy: artifact.strategy,
            importance,
        })
    }
}

/// Persistable snapshot state. The artifact store treats this as an
/// opaque blob; only the fingerprint is inspected, to decide whether a
/// stored model still matches the current roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotArtifact {
    pub version: Uuid,
    pub fitted_at: DateTime<Utc>,
    pub fingerprint: String,
    pub doctors: Vec<DoctorRecord>,
    pub vocabulary: FeatureVocabulary,
    pub classifier: Option<ConditionClassifier>,
    pub strategy: ScoringStrategy,
}

/// Order-insensitive digest of the doctor table. Any material change
/// to any record changes the fingerprint and forces a full refit.
pub fn roster_fingerprint(doctors: &[DoctorRecord]) -> Result<String> {
    let mut rows: Vec<String> = doctors
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<_, _>>()?;
    rows.sort();

    let mut hasher = Sha256::new();
    for row in &rows {
        hasher.update(row.as_bytes());
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirank_test_utils::{sample_roster, DoctorBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fit_selects_model_strategy() {
        let snapshot = ModelSnapshot::fit(sample_roster(), &RecommenderConfig::default()).unwrap();
        assert_eq!(snapshot.strategy, ScoringStrategy::ModelBased);
        assert!(snapshot.classifier.is_some());
        assert_eq!(snapshot.features.matrix.nrows(), snapshot.doctors.len());
    }

    #[test]
    fn test_fit_without_conditions_selects_keyword() {
        let doctors = vec![
            DoctorBuilder::new("A").build(),
            DoctorBuilder::new("B").build(),
        ];
        let snapshot = ModelSnapshot::fit(doctors, &RecommenderConfig::default()).unwrap();
        assert_eq!(snapshot.strategy, ScoringStrategy::KeywordBased);
        assert!(snapshot.classifier.is_none());
    }

    #[test]
    fn test_fingerprint_is_order_insensitive() {
        let mut roster = sample_roster();
        let fp1 = roster_fingerprint(&roster).unwrap();
        roster.reverse();
        let fp2 = roster_fingerprint(&roster).unwrap();
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_fingerprint_changes_on_edit() {
        let mut roster = sample_roster();
        let fp1 = roster_fingerprint(&roster).unwrap();
        roster[0].rating = 1.0;
        let fp2 = roster_fingerprint(&roster).unwrap();
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn test_artifact_round_trip_preserves_scoring_state() {
        let snapshot = ModelSnapshot::fit(sample_roster(), &RecommenderConfig::default()).unwrap();
        let blob = serde_json::to_string(&snapshot.to_artifact()).unwrap();
        let artifact: SnapshotArtifact = serde_json::from_str(&blob).unwrap();
        let restored = ModelSnapshot::from_artifact(artifact).unwrap();

        assert_eq!(restored.version, snapshot.version);
        assert_eq!(restored.fingerprint, snapshot.fingerprint);
        assert_eq!(restored.strategy, snapshot.strategy);
        assert_eq!(restored.features.matrix, snapshot.features.matrix);
    }
}
