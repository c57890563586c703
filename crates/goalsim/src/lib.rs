//! Goal simulation service
//!
//! Wires the [`goalsim_core`] Monte Carlo engine to a thread-safe result
//! cache with TTL/LRU eviction, atomic disk snapshots, and a debounced
//! background autosave. Construct a [`service::SimulationService`] once at
//! bootstrap and hand it to whatever needs simulations:
//!
//! ```ignore
//! use goalsim::config::CacheConfig;
//! use goalsim::service::{SimulationRequest, SimulationService};
//!
//! let service = SimulationService::init(CacheConfig::from_env());
//! let result = service.simulate(&request, false, None)?;
//! service.shutdown();
//! ```

#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod logging;
pub mod service;

pub use config::CacheConfig;
pub use logging::init_logging;
pub use service::{ServiceError, SimulationRequest, SimulationService};
