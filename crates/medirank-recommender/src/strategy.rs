//! Condition matching strategies.
//!
//! The strategy is fixed when a snapshot is built: `ModelBased` when a
//! classifier trained successfully, `KeywordBased` otherwise. At query
//! time the model path can still degrade to keyword matching — for an
//! unseen label or a runtime model fault — and the keyword path itself
//! never fails.

use medirank_common::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scorer::Candidate;
use crate::snapshot::ModelSnapshot;

/// Relevance source chosen at snapshot-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Classifier probability for the queried condition label.
    ModelBased,
    /// Substring matching over condition tokens and specialization.
    KeywordBased,
}

/// Resolve per-doctor relevance for a query. Never fails: any problem
/// on the model path falls back to keyword matching.
pub fn match_relevance(snapshot: &ModelSnapshot, query: &str) -> Vec<Candidate> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return vec![];
    }

    match snapshot.strategy {
        ScoringStrategy::ModelBased => match model_relevance(snapshot, &query) {
            Ok(candidates) => candidates,
            Err(RecommendError::UnknownLabel(label)) => {
                debug!(label, "query not in trained vocabulary, using keyword match");
                keyword_relevance(snapshot, &query)
            }
            Err(e) => {
                warn!(error = %e, "model scoring failed, using keyword match");
                keyword_relevance(snapshot, &query)
            }
        },
        ScoringStrategy::KeywordBased => keyword_relevance(snapshot, &query),
    }
}

fn model_relevance(snapshot: &ModelSnapshot, query: &str) -> Result<Vec<Candidate>> {
    let classifier = snapshot
        .classifier
        .as_ref()
        .ok_or(RecommendError::NotFitted)?;
    let label_idx = snapshot
        .features
        .vocabulary
        .condition_index(query)
        .ok_or_else(|| RecommendError::UnknownLabel(query.to_string()))?;

    let mut candidates = Vec::with_capacity(snapshot.doctors.len());
    for (i, doctor) in snapshot.doctors.iter().enumerate() {
        let relevance = classifier.predict_proba(snapshot.features.matrix.row(i), label_idx)?;
        if !relevance.is_finite() {
            return Err(RecommendError::Training(format!(
                "non-finite relevance for doctor {}",
                doctor.id
            )));
        }
        candidates.push(Candidate {
            doctor: doctor.clone(),
            relevance,
            matched_conditions: matched_tokens(&snapshot.features.conditions_by_doctor[i], query),
        });
    }
    Ok(candidates)
}

/// Substring fallback: 1.0 on a condition-token hit, 0.5 when only the
/// specialization matches, excluded otherwise.
fn keyword_relevance(snapshot: &ModelSnapshot, query: &str) -> Vec<Candidate> {
    snapshot
        .doctors
        .iter()
        .enumerate()
        .filter_map(|(i, doctor)| {
            let matched = matched_tokens(&snapshot.features.conditions_by_doctor[i], query);
            let relevance = if !matched.is_empty() {
                1.0
            } else if doctor.specialization.to_lowercase().contains(query) {
                0.5
            } else {
                return None;
            };
            Some(Candidate {
                doctor: doctor.clone(),
                relevance,
                matched_conditions: matched,
            })
        })
        .collect()
}

fn matched_tokens(tokens: &[String], query: &str) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.contains(query))
        .cloned()
        .collect()
}
