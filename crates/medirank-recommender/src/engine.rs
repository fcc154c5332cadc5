//! The recommender service facade.
//!
//! Holds the current fitted snapshot behind a read lock. Scoring
//! requests clone the `Arc` and run against a consistent snapshot even
//! while a refit is in progress; a refit builds the complete new
//! snapshot first and installs it with a single pointer swap. Refits
//! themselves are serialized.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use medirank_common::{
    DoctorRecord, GeoPoint, RecommendError, RecommenderConfig, Result, ScoredResult,
    WeightBreakdown,
};
use medirank_store::{ArtifactStore, DoctorProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geo::haversine_km;
use crate::paginate::paginate;
use crate::scorer::{score_candidates, ScoreContext};
use crate::snapshot::{roster_fingerprint, ModelSnapshot, SnapshotArtifact};
use crate::strategy;

/// A scoring request. The query is free text; everything else is
/// optional refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    /// Restrict candidates to specializations containing this text.
    pub specialization: Option<String>,
    pub user_location: Option<GeoPoint>,
    /// Full override of the dynamic weights when present.
    pub weights: Option<WeightBreakdown>,
    /// 1-based page.
    pub page: usize,
    /// Per-request page size; falls back to the configured default.
    pub page_size: Option<usize>,
}

impl RecommendRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            specialization: None,
            user_location: None,
            weights: None,
            page: 1,
            page_size: None,
        }
    }
}

/// A doctor ranked purely by distance from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestDoctor {
    pub doctor: DoctorRecord,
    pub distance_km: f64,
}

/// Shared, read-mostly recommender state.
pub struct Recommender {
    config: RecommenderConfig,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
    refit_lock: tokio::sync::Mutex<()>,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(None),
            refit_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Fit a new snapshot over the given doctor table and install it.
    /// An empty table installs an empty snapshot (queries return no
    /// results) rather than failing.
    pub fn fit(&self, doctors: Vec<DoctorRecord>) -> Result<Arc<ModelSnapshot>> {
        let snapshot = if doctors.is_empty() {
            warn!("fitting over an empty doctor table");
            Arc::new(ModelSnapshot::empty()?)
        } else {
            Arc::new(ModelSnapshot::fit(doctors, &self.config)?)
        };
        self.install(snapshot.clone());
        Ok(snapshot)
    }

    /// The currently installed snapshot, if any fit has succeeded.
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn install(&self, snapshot: Arc<ModelSnapshot>) {
        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(snapshot);
    }

    /// Pull the doctor table from the provider and refit, reusing a
    /// stored artifact when its fingerprint still matches the roster.
    pub async fn refresh(
        &self,
        provider: &dyn DoctorProvider,
        artifacts: Option<&ArtifactStore>,
    ) -> Result<Arc<ModelSnapshot>> {
        let _guard = self.refit_lock.lock().await;

        let doctors = provider.all_doctors().await?;
        if doctors.is_empty() {
            warn!("provider returned no doctors");
            let snapshot = Arc::new(ModelSnapshot::empty()?);
            self.install(snapshot.clone());
            return Ok(snapshot);
        }

        let fingerprint = roster_fingerprint(&doctors)?;
        if let Some(store) = artifacts {
            if let Some(artifact) = store.load::<SnapshotArtifact>() {
                if artifact.fingerprint == fingerprint {
                    info!(version = %artifact.version, "stored model matches roster, reusing");
                    let snapshot = Arc::new(ModelSnapshot::from_artifact(artifact)?);
                    self.install(snapshot.clone());
                    return Ok(snapshot);
                }
                debug!("stored model is stale, refitting");
            }
        }

        let snapshot = Arc::new(ModelSnapshot::fit(doctors, &self.config)?);
        if let Some(store) = artifacts {
            // Persistence failure only costs a refit next start.
            if let Err(e) = store.save(&snapshot.to_artifact()) {
                warn!(error = %e, "failed to persist model artifact");
            }
        }
        self.install(snapshot.clone());
        Ok(snapshot)
    }

    /// Score doctors against the query and return the requested page.
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Vec<ScoredResult>> {
        let snapshot = self.snapshot().ok_or(RecommendError::NotFitted)?;
        if snapshot.doctors.is_empty() {
            return Ok(vec![]);
        }

        let mut candidates = strategy::match_relevance(&snapshot, &request.query);
        if let Some(filter) = &request.specialization {
            let filter = filter.trim().to_lowercase();
            if !filter.is_empty() {
                candidates.retain(|c| c.doctor.specialization.to_lowercase().contains(&filter));
            }
        }

        let ctx = ScoreContext {
            config: &self.config,
            importance: &snapshot.importance,
            variability: &snapshot.variability,
            fee_range: &snapshot.fee_range,
            user_location: request.user_location,
            query_specialization: request.specialization.as_deref(),
            explicit_weights: request.weights.as_ref(),
        };
        let results = score_candidates(&candidates, &ctx);

        let page_size = request.page_size.unwrap_or(self.config.paging.page_size);
        let page = paginate(&results, request.page, page_size).to_vec();
        info!(
            query = %request.query,
            total = results.len(),
            page = request.page,
            returned = page.len(),
            "recommendation request served"
        );
        Ok(page)
    }

    /// Rank all doctors by distance from the caller, nearest first.
    pub fn recommend_nearest(&self, location: GeoPoint, limit: usize) -> Result<Vec<NearestDoctor>> {
        let snapshot = self.snapshot().ok_or(RecommendError::NotFitted)?;

        let mut nearest: Vec<NearestDoctor> = snapshot
            .doctors
            .iter()
            .map(|d| NearestDoctor {
                doctor: d.clone(),
                distance_km: haversine_km(location, d.location_or_origin()),
            })
            .collect();
        nearest.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        });
        nearest.truncate(limit);
        Ok(nearest)
    }
}
