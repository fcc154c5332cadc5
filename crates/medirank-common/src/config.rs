//! Recommender configuration.
//!
//! The scoring constants here (weight split, contribution caps,
//! relevance threshold) were chosen empirically in production, not
//! derived from an objective. They are reference defaults, overridable
//! via TOML.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Complete recommender configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Scoring weights and thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Per-doctor contribution caps
    #[serde(default)]
    pub caps: CapsConfig,

    /// Training options
    #[serde(default)]
    pub training: TrainingConfig,

    /// Result paging
    #[serde(default)]
    pub paging: PagingConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            caps: CapsConfig::default(),
            training: TrainingConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

impl RecommenderConfig {
    /// Parse from TOML text. Missing sections and fields fall back to
    /// the defaults above.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RecommendError::Config(e.to_string()))
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RecommendError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Base weight split for the composite score. The dynamic-weight path
/// multiplies the attribute entries by feature importance, variability
/// and a capped per-doctor contribution; `similarity` is applied as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight on the condition-relevance signal
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,

    /// Weight on the specialization match indicator
    #[serde(default)]
    pub specialization: f64,

    /// Base weight on experience
    #[serde(default = "default_experience_weight")]
    pub experience: f64,

    /// Base weight on rating
    #[serde(default = "default_rating_weight")]
    pub rating: f64,

    /// Base weight on patients treated
    #[serde(default = "default_patients_weight")]
    pub patients_treated: f64,

    /// Base weight on consultation fee (lower preferred); off by default
    #[serde(default)]
    pub fee: f64,

    /// Doctors below this relevance are dropped before scoring
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_similarity_weight() -> f64 { 0.60 }
fn default_experience_weight() -> f64 { 0.20 }
fn default_rating_weight() -> f64 { 0.15 }
fn default_patients_weight() -> f64 { 0.05 }
fn default_min_score() -> f64 { 0.1 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity: default_similarity_weight(),
            specialization: 0.0,
            experience: default_experience_weight(),
            rating: default_rating_weight(),
            patients_treated: default_patients_weight(),
            fee: 0.0,
            min_score: default_min_score(),
        }
    }
}

// ── Contribution caps ────────────────────────────────────────────────────────

/// Reference ceilings for min-max-clamped per-doctor contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapsConfig {
    /// Years of experience at which the contribution saturates
    #[serde(default = "default_experience_cap")]
    pub experience_years: f64,

    /// Rating scale maximum
    #[serde(default = "default_rating_cap")]
    pub rating: f64,

    /// Patient count at which the contribution saturates
    #[serde(default = "default_patients_cap")]
    pub patients_treated: f64,
}

fn default_experience_cap() -> f64 { 15.0 }
fn default_rating_cap() -> f64 { 5.0 }
fn default_patients_cap() -> f64 { 1000.0 }

impl Default for CapsConfig {
    fn default() -> Self {
        Self {
            experience_years: default_experience_cap(),
            rating: default_rating_cap(),
            patients_treated: default_patients_cap(),
        }
    }
}

// ── Training ─────────────────────────────────────────────────────────────────

/// Classifier training options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Gradient descent epochs per label
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Gradient descent step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 penalty on the weights
    #[serde(default = "default_l2")]
    pub l2: f64,
}

fn default_epochs() -> usize { 200 }
fn default_learning_rate() -> f64 { 0.5 }
fn default_l2() -> f64 { 1e-3 }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            l2: default_l2(),
        }
    }
}

// ── Paging ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize { 6 }

impl Default for PagingConfig {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}
