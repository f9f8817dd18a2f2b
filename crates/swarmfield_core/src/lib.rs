//! # Swarmfield Core
//!
//! The grid-based simulation kernel behind the swarmfield visualizations.
//!
//! This crate contains pure numerical transforms, including:
//! - Pheromone field diffusion, evaporation and point deposits
//! - Spatial hashing for 3x3 neighborhood candidate queries
//! - Boids and ant-sensor steering built on those two
//! - Equilibrium thermodynamics over the static reaction catalog
//! - Configuration, diagnostics counters and structured logging
//!
//! ## Architecture
//!
//! Nothing here owns a clock or a loop. A host calls into the kernel once per
//! tick:
//! - **Double-buffered fields**: a step reads the current grid and writes a
//!   fresh one, so readers never see a half-updated state
//! - **Throwaway indices**: the spatial hash is rebuilt from each tick's
//!   snapshot instead of being maintained incrementally
//! - **Explicit configuration**: tuning values arrive as arguments
//!
//! ## Example
//!
//! ```
//! use swarmfield_core::pheromone::{create_field, deposit, diffuse_evaporate, total};
//!
//! let (cols, rows) = (5, 5);
//! let mut field = create_field(cols, rows);
//! assert!(deposit(&mut field, cols, rows, 2, 2, 100.0, 255.0));
//!
//! let next = diffuse_evaporate(&field, cols, rows, 0.15, 1.0);
//! assert!(next[12] < 100.0);
//! assert!((total(&next) - 100.0).abs() < 5.0);
//! ```

/// Configuration management for kernel parameters
pub mod config;
/// Reaction quotient and equilibrium thermodynamics
pub mod equilibrium;
/// Construction-time error types
pub mod error;
/// Diagnostics counters and logging setup
pub mod metrics;
/// Pheromone field engine
pub mod pheromone;
/// Spatial hashing for O(1) neighborhood queries
pub mod spatial_hash;
/// Boids and ant steering
pub mod steering;

pub use config::KernelConfig;
pub use error::KernelError;
pub use metrics::{init_logging, KernelMetrics};
pub use pheromone::{PheromoneDeposit, PheromoneField, PheromoneKind, PheromoneMap};
pub use spatial_hash::{CellKey, Positioned, SpatialHash};
