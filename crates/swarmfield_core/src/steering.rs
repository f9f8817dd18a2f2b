//! Steering forces for flocking boids and trail-following ants.
//!
//! These consume the kernel's outputs: boids read neighbor candidates from a
//! [`SpatialHash`], ants read a [`PheromoneField`] at three sensor points.

use crate::config::{AntConfig, FlockConfig};
use crate::pheromone::PheromoneField;
use crate::spatial_hash::{Positioned, SpatialHash};
use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boid {
    pub position: DVec2,
    pub velocity: DVec2,
}

impl Boid {
    #[must_use]
    pub fn new(position: DVec2, velocity: DVec2) -> Self {
        Self { position, velocity }
    }
}

impl Positioned for Boid {
    #[inline]
    fn position(&self) -> (f64, f64) {
        (self.position.x, self.position.y)
    }
}

/// Clamps the magnitude of `v` to `max`.
#[inline]
#[must_use]
pub fn limit(v: DVec2, max: f64) -> DVec2 {
    v.clamp_length_max(max)
}

/// Reynolds steering: desired direction at full speed, minus current
/// velocity, limited to `max_force`.
fn steer_towards(desired: DVec2, velocity: DVec2, cfg: &FlockConfig) -> DVec2 {
    let direction = desired.normalize_or_zero();
    if direction == DVec2::ZERO {
        return DVec2::ZERO;
    }
    limit(direction * cfg.max_speed - velocity, cfg.max_force)
}

/// Neighbors strictly closer than `radius`, skipping coincident boids
/// (which covers the boid itself).
fn within<'a>(
    boid: &'a Boid,
    neighbors: &'a [&'a Boid],
    radius: f64,
) -> impl Iterator<Item = (&'a Boid, f64)> + 'a {
    neighbors.iter().filter_map(move |&other| {
        let d = boid.position.distance(other.position);
        (d > 0.0 && d < radius).then_some((other, d))
    })
}

/// Steers away from neighbors inside `separation_distance`, weighted by
/// inverse distance.
#[must_use]
pub fn separation(boid: &Boid, neighbors: &[&Boid], cfg: &FlockConfig) -> DVec2 {
    let mut sum = DVec2::ZERO;
    let mut count = 0usize;
    for (other, d) in within(boid, neighbors, cfg.separation_distance) {
        sum += (boid.position - other.position) / (d * d);
        count += 1;
    }
    if count == 0 {
        return DVec2::ZERO;
    }
    steer_towards(sum / count as f64, boid.velocity, cfg)
}

/// Steers toward the mean heading of neighbors inside `perception_radius`.
#[must_use]
pub fn alignment(boid: &Boid, neighbors: &[&Boid], cfg: &FlockConfig) -> DVec2 {
    let mut sum = DVec2::ZERO;
    let mut count = 0usize;
    for (other, _) in within(boid, neighbors, cfg.perception_radius) {
        sum += other.velocity;
        count += 1;
    }
    if count == 0 {
        return DVec2::ZERO;
    }
    steer_towards(sum / count as f64, boid.velocity, cfg)
}

/// Steers toward the centroid of neighbors inside `perception_radius`.
#[must_use]
pub fn cohesion(boid: &Boid, neighbors: &[&Boid], cfg: &FlockConfig) -> DVec2 {
    let mut sum = DVec2::ZERO;
    let mut count = 0usize;
    for (other, _) in within(boid, neighbors, cfg.perception_radius) {
        sum += other.position;
        count += 1;
    }
    if count == 0 {
        return DVec2::ZERO;
    }
    steer_towards(sum / count as f64 - boid.position, boid.velocity, cfg)
}

/// Weighted sum of separation, alignment and cohesion for one boid.
///
/// `index` must be built with a cell size of at least
/// `cfg.perception_radius` (see [`FlockConfig::hash_cell_size`]).
#[must_use]
pub fn flock_force(boid: &Boid, index: &SpatialHash<'_, Boid>, cfg: &FlockConfig) -> DVec2 {
    debug_assert!(
        index.cell_size() >= cfg.perception_radius,
        "hash cells smaller than the perception radius miss neighbors"
    );
    let candidates = index.query(boid);
    separation(boid, &candidates, cfg) * cfg.separation_weight
        + alignment(boid, &candidates, cfg) * cfg.alignment_weight
        + cohesion(boid, &candidates, cfg) * cfg.cohesion_weight
}

/// Which way an ant should turn after sensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Straight,
    Right,
}

/// World positions of the left, center and right sensors.
///
/// Headings are radians, counter-clockwise from +x; "left" is
/// `heading + sensor_angle`.
#[must_use]
pub fn sensor_positions(position: DVec2, heading: f64, cfg: &AntConfig) -> [DVec2; 3] {
    let at = |angle: f64| position + DVec2::from_angle(angle) * cfg.sensor_distance;
    [
        at(heading + cfg.sensor_angle),
        at(heading),
        at(heading - cfg.sensor_angle),
    ]
}

/// Picks a turn from three sensor readings.
///
/// Keeps straight when the center reading is at least as strong as both
/// sides, or when the sides tie.
#[must_use]
pub fn choose_turn(left: f32, center: f32, right: f32) -> Turn {
    if center >= left && center >= right {
        Turn::Straight
    } else if left > right {
        Turn::Left
    } else if right > left {
        Turn::Right
    } else {
        Turn::Straight
    }
}

/// Samples `field` at the three sensors and picks a turn. Sensors that fall
/// off the grid read zero.
#[must_use]
pub fn sense_turn(field: &PheromoneField, position: DVec2, heading: f64, cfg: &AntConfig) -> Turn {
    let [left, center, right] =
        sensor_positions(position, heading, cfg).map(|p| field.sample_world(p.x, p.y));
    choose_turn(left, center, right)
}

#[must_use]
pub fn apply_turn(heading: f64, turn: Turn, turn_rate: f64) -> f64 {
    match turn {
        Turn::Left => heading + turn_rate,
        Turn::Straight => heading,
        Turn::Right => heading - turn_rate,
    }
}
