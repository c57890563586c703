//! Simulation service: cache-aside execution and process lifecycle.
//!
//! The service is an explicit object constructed once at bootstrap and
//! passed by reference to whoever needs simulations — there is no global
//! cache. `init` loads the snapshot and starts the autosave scheduler
//! (when configured to); `shutdown` flushes a final save.

use std::sync::Arc;

use serde::Serialize;

use goalsim_core::error::SimulationError;
use goalsim_core::model::{GoalSpec, ReturnAssumptions, SimulationResult};
use goalsim_core::parallel::run_goal_parallel;

use crate::cache::{AutosaveHandle, CacheStats, SimulationCache, cache_key};
use crate::config::CacheConfig;

/// Errors surfaced to callers of the service.
///
/// Cache I/O problems are deliberately absent: they are logged and the
/// in-memory cache carries on, per the non-fatal persistence policy.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}

/// Everything that identifies one simulation run.
///
/// Doubles as the cache-key payload: identical requests hash to the same
/// entry no matter how the caller assembled them.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRequest {
    pub goal: GoalSpec,
    pub assumptions: ReturnAssumptions,
    pub inflation_rate: f64,
    pub simulation_count: usize,
    pub time_horizon_years: Option<u32>,
    pub seed: u64,
}

impl SimulationRequest {
    /// Cache key: goal-kind namespace in clear text plus an input digest
    #[must_use]
    pub fn cache_key(&self) -> String {
        cache_key(&format!("sim:{}", self.goal.kind.label()), self)
    }
}

/// Cache-aside simulation runner with an explicit lifecycle
pub struct SimulationService {
    cache: Arc<SimulationCache<SimulationResult>>,
    autosave: Option<AutosaveHandle>,
    config: CacheConfig,
}

impl SimulationService {
    /// Construct the service. With `auto_init` set (and caching enabled)
    /// this loads the disk snapshot and starts the autosave scheduler.
    #[must_use]
    pub fn init(config: CacheConfig) -> Self {
        let cache = Arc::new(SimulationCache::new(&config));
        let mut autosave = None;

        if config.enabled && config.auto_init {
            let path = config.snapshot_path();
            match cache.load(&path) {
                Ok(restored) => {
                    tracing::info!(entries = restored, path = %path.display(), "cache snapshot loaded");
                }
                Err(e) => {
                    // Missing or corrupt snapshots are expected on first
                    // run; start empty
                    tracing::warn!(path = %path.display(), error = %e, "starting with an empty cache");
                }
            }
            autosave = Some(AutosaveHandle::start(
                cache.clone(),
                path,
                config.auto_save_interval,
            ));
        }

        Self {
            cache,
            autosave,
            config,
        }
    }

    /// Cache-aside execution: check the cache, invoke `compute` on a miss,
    /// store the result. `bypass` skips the read (forced refresh) but
    /// still stores; a disabled cache always computes and never stores.
    pub fn run_cached<F>(
        &self,
        request: &SimulationRequest,
        bypass: bool,
        compute: F,
    ) -> Result<SimulationResult, ServiceError>
    where
        F: FnOnce() -> Result<SimulationResult, SimulationError>,
    {
        if !self.config.enabled {
            return Ok(compute()?);
        }

        let key = request.cache_key();
        if !bypass {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(key = %key, "simulation cache hit");
                return Ok(hit);
            }
        }

        let result = compute()?;
        self.cache.set(&key, result.clone(), None);
        self.notify_dirty();
        Ok(result)
    }

    /// Run (or fetch) the simulation described by `request`, fanning out
    /// across `max_workers` on a miss
    pub fn simulate(
        &self,
        request: &SimulationRequest,
        bypass: bool,
        max_workers: Option<usize>,
    ) -> Result<SimulationResult, ServiceError> {
        self.run_cached(request, bypass, || {
            run_goal_parallel(
                &request.goal,
                &request.assumptions,
                request.inflation_rate,
                request.simulation_count,
                request.time_horizon_years,
                request.seed,
                max_workers,
            )
        })
    }

    /// Remove all entries, or those whose key contains `pattern`
    pub fn invalidate(&self, pattern: Option<&str>) -> usize {
        let removed = self.cache.invalidate(pattern);
        if removed > 0 {
            tracing::info!(removed, pattern = pattern.unwrap_or("*"), "cache invalidated");
            self.notify_dirty();
        }
        removed
    }

    /// Sweep expired entries
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.cache.cleanup_expired();
        if removed > 0 {
            self.notify_dirty();
        }
        removed
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn notify_dirty(&self) {
        if let Some(autosave) = &self.autosave {
            autosave.mark_dirty();
        }
    }

    /// Tear down: stop the scheduler and flush a final save if dirty
    pub fn shutdown(mut self) {
        if let Some(autosave) = self.autosave.take() {
            // The scheduler's shutdown path performs the flush
            autosave.shutdown();
        } else if self.config.enabled && self.cache.is_dirty() {
            let path = self.config.snapshot_path();
            if let Err(e) = self.cache.save(&path) {
                tracing::warn!(path = %path.display(), error = %e, "final cache save failed");
            }
        }
    }
}
