//! Composite score computation and ranking.
//!
//! composite = Σ w_i × c_i over the six contribution terms
//! (relevance, specialization match, capped experience, rating,
//! patients treated, fee cheapness). Weights come from the dynamic
//! formula unless the caller supplied an explicit set.

use std::cmp::Ordering;

use medirank_common::{
    DoctorRecord, GeoPoint, RecommenderConfig, ScoredResult, WeightBreakdown,
};

use crate::geo::haversine_km;
use crate::weights::{
    capped_contribution, AttributeImportance, AttributeVariability, FeeRange,
};

/// A doctor that survived condition matching, with its relevance signal.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub doctor: DoctorRecord,
    /// Relevance in [0, 1] from the model or keyword path.
    pub relevance: f64,
    pub matched_conditions: Vec<String>,
}

/// Everything the scorer needs beyond the candidates themselves.
pub struct ScoreContext<'a> {
    pub config: &'a RecommenderConfig,
    pub importance: &'a AttributeImportance,
    pub variability: &'a AttributeVariability,
    pub fee_range: &'a FeeRange,
    pub user_location: Option<GeoPoint>,
    /// Specialization the caller asked for, for the match indicator.
    pub query_specialization: Option<&'a str>,
    /// Full override of the dynamic weights when present.
    pub explicit_weights: Option<&'a WeightBreakdown>,
}

/// Score, rank, and materialize results. Input records are copied into
/// the results; nothing in `candidates` is mutated in place.
pub fn score_candidates(candidates: &[Candidate], ctx: &ScoreContext<'_>) -> Vec<ScoredResult> {
    let dynamic = crate::weights::dynamic_weights(&ctx.config.scoring, ctx.importance, ctx.variability);

    let mut results: Vec<ScoredResult> = candidates
        .iter()
        .filter(|c| c.relevance >= ctx.config.scoring.min_score)
        .map(|c| {
            let weights = ctx.explicit_weights.cloned().unwrap_or_else(|| dynamic.clone());
            let contributions = contribution_terms(&c.doctor, c.relevance, ctx);
            let composite = weights
                .as_array()
                .iter()
                .zip(contributions.iter())
                .map(|(w, c)| w * c)
                .sum();

            let distance_km = ctx
                .user_location
                .map(|user| haversine_km(user, c.doctor.location_or_origin()));

            ScoredResult {
                doctor: c.doctor.clone(),
                similarity_score: c.relevance,
                composite_score: composite,
                matched_conditions: c.matched_conditions.clone(),
                distance_km,
                weight_components: weights,
            }
        })
        .collect();

    results.sort_by(rank_order);
    results
}

/// The six contribution terms, aligned with `WeightBreakdown::as_array`.
fn contribution_terms(doctor: &DoctorRecord, relevance: f64, ctx: &ScoreContext<'_>) -> [f64; 6] {
    let caps = &ctx.config.caps;
    let spec_match = ctx
        .query_specialization
        .map(|q| doctor.specialization.eq_ignore_ascii_case(q.trim()))
        .unwrap_or(false);

    [
        relevance,
        if spec_match { 1.0 } else { 0.0 },
        capped_contribution(doctor.experience_years as f64, caps.experience_years),
        capped_contribution(doctor.rating, caps.rating),
        capped_contribution(doctor.patients_treated as f64, caps.patients_treated),
        ctx.fee_range.cheapness(doctor.consultation_fee as f64),
    ]
}

/// Ordering: composite desc, then experience desc, rating desc,
/// patients treated desc, fee asc.
pub fn rank_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.composite_score
        .partial_cmp(&a.composite_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.doctor.experience_years.cmp(&a.doctor.experience_years))
        .then_with(|| {
            b.doctor
                .rating
                .partial_cmp(&a.doctor.rating)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.doctor.patients_treated.cmp(&a.doctor.patients_treated))
        .then_with(|| a.doctor.consultation_fee.cmp(&b.doctor.consultation_fee))
}
