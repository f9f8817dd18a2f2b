//! Configuration for the simulation kernel.
//!
//! This module provides strongly-typed configuration structures that map to
//! a `swarmfield.toml` file. Every tuning value the kernel consumes lives
//! here and is passed into calls explicitly; the kernel itself has no
//! module-level defaults.
//!
//! ## Example `swarmfield.toml`
//!
//! ```toml
//! [field]
//! cols = 160
//! rows = 120
//! cell_size = 5.0
//! diffusion_rate = 0.15
//! evaporation_rate = 0.98
//! max_level = 255.0
//!
//! [flock]
//! perception_radius = 50.0
//! separation_distance = 25.0
//!
//! [ants]
//! sensor_angle = 0.785
//! sensor_distance = 15.0
//! ```

use serde::{Deserialize, Serialize};

/// Pheromone grid geometry and per-tick rates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub cols: usize,
    pub rows: usize,
    /// World units per grid cell
    pub cell_size: f64,
    pub diffusion_rate: f32,
    /// Multiplier applied every tick; 1.0 disables decay
    pub evaporation_rate: f32,
    pub max_level: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            cols: 160,
            rows: 120,
            cell_size: 5.0,
            diffusion_rate: 0.15,
            evaporation_rate: 0.98,
            max_level: 255.0,
        }
    }
}

/// Boids steering parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FlockConfig {
    pub perception_radius: f64,
    pub separation_distance: f64,
    pub max_speed: f64,
    pub max_force: f64,
    pub separation_weight: f64,
    pub alignment_weight: f64,
    pub cohesion_weight: f64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            perception_radius: 50.0,
            separation_distance: 25.0,
            max_speed: 4.0,
            max_force: 0.1,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
        }
    }
}

impl FlockConfig {
    /// Cell size for the spatial hash that feeds this flock.
    ///
    /// Equal to the perception radius, which keeps every neighbor inside the
    /// 3x3 query block.
    #[must_use]
    pub fn hash_cell_size(&self) -> f64 {
        self.perception_radius
    }
}

/// Ant sensor geometry. Angles are in radians.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AntConfig {
    /// Offset of the left/right sensors from the heading
    pub sensor_angle: f64,
    /// Distance from the ant to each sensor
    pub sensor_distance: f64,
    pub turn_rate: f64,
    pub deposit_amount: f32,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            sensor_angle: std::f64::consts::FRAC_PI_4,
            sensor_distance: 15.0,
            turn_rate: 0.3,
            deposit_amount: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub field: FieldConfig,
    pub flock: FlockConfig,
    pub ants: AntConfig,
}

impl KernelConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` when every parameter is usable, or `Err` describing
    /// the first failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Field validation
        anyhow::ensure!(self.field.cols > 0, "Field cols must be positive");
        anyhow::ensure!(self.field.rows > 0, "Field rows must be positive");
        anyhow::ensure!(
            self.field.cols.checked_mul(self.field.rows).is_some(),
            "Field dimensions overflow"
        );
        anyhow::ensure!(
            self.field.cell_size.is_finite() && self.field.cell_size > 0.0,
            "Field cell size must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.field.diffusion_rate),
            "Diffusion rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.field.evaporation_rate),
            "Evaporation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(self.field.max_level > 0.0, "Max level must be positive");

        // Flock validation
        anyhow::ensure!(
            self.flock.perception_radius.is_finite() && self.flock.perception_radius > 0.0,
            "Perception radius must be positive"
        );
        anyhow::ensure!(
            self.flock.separation_distance >= 0.0,
            "Separation distance must be non-negative"
        );
        anyhow::ensure!(
            self.flock.separation_distance <= self.flock.perception_radius,
            "Separation distance must not exceed perception radius"
        );
        anyhow::ensure!(self.flock.max_speed > 0.0, "Max speed must be positive");
        anyhow::ensure!(self.flock.max_force >= 0.0, "Max force must be non-negative");
        anyhow::ensure!(
            self.flock.separation_weight >= 0.0
                && self.flock.alignment_weight >= 0.0
                && self.flock.cohesion_weight >= 0.0,
            "Steering weights must be non-negative"
        );

        // Ant validation
        anyhow::ensure!(
            (0.0..=std::f64::consts::PI).contains(&self.ants.sensor_angle),
            "Sensor angle must be in [0, pi]"
        );
        anyhow::ensure!(
            self.ants.sensor_distance >= 0.0,
            "Sensor distance must be non-negative"
        );
        anyhow::ensure!(self.ants.turn_rate >= 0.0, "Turn rate must be non-negative");
        anyhow::ensure!(
            self.ants.deposit_amount >= 0.0,
            "Deposit amount must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 digest of the tuning sections, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.field).as_bytes());
        hasher.update(format!("{:?}", self.flock).as_bytes());
        hasher.update(format!("{:?}", self.ants).as_bytes());
        hex::encode(hasher.finalize())
    }
}
