//! Pheromone field engine for stigmergic trail communication.
//!
//! Fields are dense row-major `f32` grids. A step reads one buffer and writes
//! another; nothing here mutates a buffer it also reads for neighbor values.
//! `deposit` is the one in-place mutation and touches a single cell.

use crate::error::{KernelError, Result};
use serde::Serialize;

/// Allocates a zero-filled `cols x rows` field.
#[must_use]
pub fn create_field(cols: usize, rows: usize) -> Vec<f32> {
    vec![0.0; cols * rows]
}

/// Converts a world position to integer grid coordinates by floor division.
///
/// No bounds checking: pair with [`read_at`] / [`deposit`], which check
/// bounds themselves.
#[inline]
#[must_use]
pub fn world_to_grid(world_x: f64, world_y: f64, cell_size: f64) -> (i32, i32) {
    (
        (world_x / cell_size).floor() as i32,
        (world_y / cell_size).floor() as i32,
    )
}

#[inline(always)]
fn index_of(cols: usize, rows: usize, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= cols || y >= rows {
        None
    } else {
        Some(y * cols + x)
    }
}

/// Diffuses and evaporates `field`, returning the next field.
///
/// Boundary cells only evaporate (`old * evaporation_rate`), so flux that
/// reaches the edge leaks out. Interior cells blend with the mean of their
/// eight neighbors:
///
/// `new = (center * (1 - d) + (neighbor_sum / 8) * d) * e`
///
/// Rates are not clamped; callers supply values in `[0, 1]`.
#[must_use]
pub fn diffuse_evaporate(
    field: &[f32],
    cols: usize,
    rows: usize,
    diffusion_rate: f32,
    evaporation_rate: f32,
) -> Vec<f32> {
    let mut next = create_field(cols, rows);
    diffuse_evaporate_into(field, &mut next, cols, rows, diffusion_rate, evaporation_rate);
    next
}

/// Same as [`diffuse_evaporate`] but writes into a caller-owned buffer.
///
/// `src` and `dst` must both hold `cols * rows` cells.
pub fn diffuse_evaporate_into(
    src: &[f32],
    dst: &mut [f32],
    cols: usize,
    rows: usize,
    diffusion_rate: f32,
    evaporation_rate: f32,
) {
    debug_assert_eq!(src.len(), cols * rows, "source length must be cols * rows");
    debug_assert_eq!(dst.len(), src.len(), "destination length must match source");
    if cols == 0 || rows == 0 {
        return;
    }

    for (y, out) in dst.chunks_exact_mut(cols).enumerate() {
        step_row(src, out, y, cols, rows, diffusion_rate, evaporation_rate);
    }
}

/// Row-parallel [`diffuse_evaporate_into`]. Each worker owns disjoint
/// destination rows and reads only from `src`, so the output is identical to
/// the sequential version.
#[cfg(feature = "parallel")]
pub fn diffuse_evaporate_par(
    src: &[f32],
    dst: &mut [f32],
    cols: usize,
    rows: usize,
    diffusion_rate: f32,
    evaporation_rate: f32,
) {
    use rayon::prelude::*;

    debug_assert_eq!(src.len(), cols * rows, "source length must be cols * rows");
    debug_assert_eq!(dst.len(), src.len(), "destination length must match source");
    if cols == 0 || rows == 0 {
        return;
    }

    dst.par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(y, out)| {
            step_row(src, out, y, cols, rows, diffusion_rate, evaporation_rate);
        });
}

#[inline]
fn step_row(
    src: &[f32],
    out: &mut [f32],
    y: usize,
    cols: usize,
    rows: usize,
    diffusion_rate: f32,
    evaporation_rate: f32,
) {
    let row = &src[y * cols..(y + 1) * cols];

    if y == 0 || y + 1 == rows {
        for (o, &v) in out.iter_mut().zip(row) {
            *o = v * evaporation_rate;
        }
        return;
    }

    let above = &src[(y - 1) * cols..y * cols];
    let below = &src[(y + 1) * cols..(y + 2) * cols];

    out[0] = row[0] * evaporation_rate;
    out[cols - 1] = row[cols - 1] * evaporation_rate;

    for x in 1..cols.saturating_sub(1) {
        let neighbor_sum = above[x - 1]
            + above[x]
            + above[x + 1]
            + row[x - 1]
            + row[x + 1]
            + below[x - 1]
            + below[x]
            + below[x + 1];
        let diffused = row[x] * (1.0 - diffusion_rate) + (neighbor_sum / 8.0) * diffusion_rate;
        out[x] = diffused * evaporation_rate;
    }
}

/// Elementwise decay with no diffusion and no boundary distinction.
#[must_use]
pub fn evaporate_only(field: &[f32], evaporation_rate: f32) -> Vec<f32> {
    field.iter().map(|&v| v * evaporation_rate).collect()
}

/// Adds `amount` at `(x, y)`, saturating at `max_level`.
///
/// Returns `false` without touching the field when the coordinate is outside
/// `[0, cols) x [0, rows)`.
pub fn deposit(
    field: &mut [f32],
    cols: usize,
    rows: usize,
    x: i32,
    y: i32,
    amount: f32,
    max_level: f32,
) -> bool {
    match index_of(cols, rows, x, y) {
        Some(idx) => {
            field[idx] = (field[idx] + amount).min(max_level);
            true
        }
        None => {
            tracing::trace!(x, y, cols, rows, "deposit outside field");
            false
        }
    }
}

/// Reads the value at `(x, y)`; out-of-bounds coordinates read as `0`.
#[must_use]
pub fn read_at(field: &[f32], cols: usize, rows: usize, x: i32, y: i32) -> f32 {
    index_of(cols, rows, x, y).map_or(0.0, |idx| field[idx])
}

/// Sum over every cell, used for mass-conservation checks.
#[must_use]
pub fn total(field: &[f32]) -> f32 {
    field.iter().sum()
}

/// A double-buffered scalar field with its grid geometry.
///
/// `cells` is the current state; `back_buffer` receives the next state and is
/// swapped in after every step, so a reader of `values()` never observes a
/// half-written grid.
#[derive(Serialize, Clone, Debug)]
pub struct PheromoneField {
    cols: usize,
    rows: usize,
    cell_size: f64,
    max_level: f32,
    cells: Vec<f32>,
    #[serde(skip)]
    back_buffer: Vec<f32>,
}

impl PheromoneField {
    /// Creates a zero-filled field.
    pub fn new(cols: usize, rows: usize, cell_size: f64, max_level: f32) -> Result<Self> {
        Self::from_values(cols, rows, cell_size, max_level, create_field(cols, rows))
    }

    /// Wraps existing values, checking that they match the declared geometry.
    pub fn from_values(
        cols: usize,
        rows: usize,
        cell_size: f64,
        max_level: f32,
        values: Vec<f32>,
    ) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(KernelError::EmptyGrid { cols, rows });
        }
        KernelError::check_cell_size(cell_size)?;
        if values.len() != cols * rows {
            return Err(KernelError::DimensionMismatch {
                cols,
                rows,
                len: values.len(),
            });
        }
        Ok(Self {
            cols,
            rows,
            cell_size,
            max_level,
            back_buffer: create_field(cols, rows),
            cells: values,
        })
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[must_use]
    pub fn max_level(&self) -> f32 {
        self.max_level
    }

    /// Current cell values, row-major.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    /// Diffuses and evaporates one tick, then swaps buffers.
    pub fn step(&mut self, diffusion_rate: f32, evaporation_rate: f32) {
        diffuse_evaporate_into(
            &self.cells,
            &mut self.back_buffer,
            self.cols,
            self.rows,
            diffusion_rate,
            evaporation_rate,
        );
        std::mem::swap(&mut self.cells, &mut self.back_buffer);
        tracing::debug!(
            cols = self.cols,
            rows = self.rows,
            diffusion_rate,
            evaporation_rate,
            "pheromone field step"
        );
    }

    /// Parallel variant of [`PheromoneField::step`].
    #[cfg(feature = "parallel")]
    pub fn step_par(&mut self, diffusion_rate: f32, evaporation_rate: f32) {
        diffuse_evaporate_par(
            &self.cells,
            &mut self.back_buffer,
            self.cols,
            self.rows,
            diffusion_rate,
            evaporation_rate,
        );
        std::mem::swap(&mut self.cells, &mut self.back_buffer);
        tracing::debug!(cols = self.cols, rows = self.rows, "pheromone field parallel step");
    }

    /// Decays every cell without diffusion.
    pub fn evaporate(&mut self, evaporation_rate: f32) {
        for (next, &v) in self.back_buffer.iter_mut().zip(&self.cells) {
            *next = v * evaporation_rate;
        }
        std::mem::swap(&mut self.cells, &mut self.back_buffer);
    }

    /// Deposits at grid coordinates. See [`deposit`].
    pub fn deposit(&mut self, x: i32, y: i32, amount: f32) -> bool {
        deposit(
            &mut self.cells,
            self.cols,
            self.rows,
            x,
            y,
            amount,
            self.max_level,
        )
    }

    /// Deposits at a world position, converted with this field's cell size.
    pub fn deposit_world(&mut self, world_x: f64, world_y: f64, amount: f32) -> bool {
        let (x, y) = world_to_grid(world_x, world_y, self.cell_size);
        self.deposit(x, y, amount)
    }

    #[must_use]
    pub fn read_at(&self, x: i32, y: i32) -> f32 {
        read_at(&self.cells, self.cols, self.rows, x, y)
    }

    /// Reads the cell under a world position; off-grid positions read `0`.
    #[must_use]
    pub fn sample_world(&self, world_x: f64, world_y: f64) -> f32 {
        let (x, y) = world_to_grid(world_x, world_y, self.cell_size);
        self.read_at(x, y)
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        total(&self.cells)
    }
}

/// Trail chemicals laid by a colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PheromoneKind {
    Food, // "food is this way"
    Home, // "nest is this way"
}

impl PheromoneKind {
    pub const ALL: [PheromoneKind; 2] = [PheromoneKind::Food, PheromoneKind::Home];
}

/// A request to deposit pheromone at a world position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PheromoneDeposit {
    pub x: f64,
    pub y: f64,
    pub kind: PheromoneKind,
    pub amount: f32,
}

/// One field per [`PheromoneKind`], sharing a geometry.
#[derive(Serialize, Clone, Debug)]
pub struct PheromoneMap {
    pub food: PheromoneField,
    pub home: PheromoneField,
}

impl PheromoneMap {
    pub fn new(cols: usize, rows: usize, cell_size: f64, max_level: f32) -> Result<Self> {
        let food = PheromoneField::new(cols, rows, cell_size, max_level)?;
        let home = food.clone();
        Ok(Self { food, home })
    }

    #[must_use]
    pub fn layer(&self, kind: PheromoneKind) -> &PheromoneField {
        match kind {
            PheromoneKind::Food => &self.food,
            PheromoneKind::Home => &self.home,
        }
    }

    pub fn layer_mut(&mut self, kind: PheromoneKind) -> &mut PheromoneField {
        match kind {
            PheromoneKind::Food => &mut self.food,
            PheromoneKind::Home => &mut self.home,
        }
    }

    /// Applies a tick's deposit events, returning how many landed on the grid.
    pub fn apply_deposits(&mut self, deposits: &[PheromoneDeposit]) -> usize {
        deposits
            .iter()
            .filter(|d| self.layer_mut(d.kind).deposit_world(d.x, d.y, d.amount))
            .count()
    }

    /// Steps every layer with the same rates.
    pub fn step(&mut self, diffusion_rate: f32, evaporation_rate: f32) {
        for kind in PheromoneKind::ALL {
            self.layer_mut(kind).step(diffusion_rate, evaporation_rate);
        }
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.food.total() + self.home.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_field(cols: usize, rows: usize, seed: u64) -> Vec<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..cols * rows).map(|_| rng.gen_range(0.0..10.0)).collect()
    }

    fn is_edge(i: usize, cols: usize, rows: usize) -> bool {
        let (x, y) = (i % cols, i / cols);
        x == 0 || y == 0 || x == cols - 1 || y == rows - 1
    }

    #[test]
    fn test_center_impulse_scenario() {
        let mut field = create_field(5, 5);
        field[12] = 100.0;
        let result = diffuse_evaporate(&field, 5, 5, 0.15, 1.0);

        assert!(result[12] < 100.0);
        for idx in [7, 17, 11, 13] {
            assert!(result[idx] > 0.0, "cell {idx} received nothing");
        }
        let sum = total(&result);
        assert!((sum - 100.0).abs() <= 5.0, "sum drifted to {sum}");
        assert!((result[12] - 85.0).abs() < 1e-4);
        assert!((result[6] - 1.875).abs() < 1e-5);
    }

    #[test]
    fn test_boundaries_unchanged_without_evaporation() {
        let (cols, rows) = (9, 7);
        let field = random_field(cols, rows, 7);
        let result = diffuse_evaporate(&field, cols, rows, 0.6, 1.0);
        for i in (0..field.len()).filter(|&i| is_edge(i, cols, rows)) {
            assert_eq!(result[i], field[i], "edge cell {i} changed");
        }
    }

    #[test]
    fn test_full_evaporation_zeroes_everything() {
        let field = random_field(6, 6, 11);
        let result = diffuse_evaporate(&field, 6, 6, 0.3, 0.0);
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_boundary_cells_only_evaporate() {
        let (cols, rows) = (5, 4);
        let field = random_field(cols, rows, 3);
        let result = diffuse_evaporate(&field, cols, rows, 0.9, 0.5);
        for i in (0..field.len()).filter(|&i| is_edge(i, cols, rows)) {
            assert_eq!(result[i], field[i] * 0.5);
        }
    }

    #[test]
    fn test_interior_mass_is_nearly_conserved() {
        let (cols, rows) = (41, 41);
        let mut field = create_field(cols, rows);
        field[20 * cols + 20] = 500.0;
        let before = total(&field);
        let after = total(&diffuse_evaporate(&field, cols, rows, 0.25, 1.0));
        assert!(after <= before + 1e-3);
        assert!(after > 0.95 * before);
    }

    #[test]
    fn test_diffusion_rate_is_monotonic() {
        let mut field = create_field(5, 5);
        field[12] = 100.0;
        let low = diffuse_evaporate(&field, 5, 5, 0.1, 1.0);
        let high = diffuse_evaporate(&field, 5, 5, 0.4, 1.0);
        for idx in [6, 7, 8, 11, 13, 16, 17, 18] {
            assert!(high[idx] > low[idx], "neighbor {idx} did not grow");
        }
        assert!(high[12] <= low[12]);
    }

    #[test]
    fn test_thin_grids_have_no_interior() {
        let field = vec![4.0, 8.0, 2.0];
        assert_eq!(diffuse_evaporate(&field, 3, 1, 0.5, 0.5), vec![2.0, 4.0, 1.0]);
        assert_eq!(diffuse_evaporate(&field, 1, 3, 0.5, 0.5), vec![2.0, 4.0, 1.0]);
        assert_eq!(diffuse_evaporate(&[6.0], 1, 1, 0.5, 0.5), vec![3.0]);
    }

    #[test]
    fn test_source_is_left_untouched() {
        let field = random_field(8, 8, 5);
        let copy = field.clone();
        let _ = diffuse_evaporate(&field, 8, 8, 0.5, 0.9);
        assert_eq!(field, copy);
    }

    #[test]
    fn test_evaporate_only_scales_every_cell() {
        let field = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(evaporate_only(&field, 0.5), vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_deposit_accumulates_and_saturates() {
        let mut field = create_field(4, 4);
        assert!(deposit(&mut field, 4, 4, 2, 1, 3.0, 10.0));
        assert!(deposit(&mut field, 4, 4, 2, 1, 4.0, 10.0));
        assert_eq!(read_at(&field, 4, 4, 2, 1), 7.0);
        assert!(deposit(&mut field, 4, 4, 2, 1, 50.0, 10.0));
        assert_eq!(read_at(&field, 4, 4, 2, 1), 10.0);
        assert!(deposit(&mut field, 4, 4, 2, 1, 1.0, 10.0));
        assert_eq!(read_at(&field, 4, 4, 2, 1), 10.0);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut field = create_field(4, 3);
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (4, 3), (i32::MIN, i32::MAX)] {
            assert!(!deposit(&mut field, 4, 3, x, y, 1.0, 10.0));
            assert_eq!(read_at(&field, 4, 3, x, y), 0.0);
        }
        assert_eq!(total(&field), 0.0);
    }

    #[test]
    fn test_world_to_grid_floors() {
        assert_eq!(world_to_grid(25.0, 75.0, 50.0), (0, 1));
        assert_eq!(world_to_grid(-0.5, -50.0, 50.0), (-1, -1));
        assert_eq!(world_to_grid(-50.5, 100.0, 50.0), (-2, 2));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_step_matches_sequential() {
        let (cols, rows) = (33, 17);
        let field = random_field(cols, rows, 99);
        let sequential = diffuse_evaporate(&field, cols, rows, 0.2, 0.97);
        let mut parallel = create_field(cols, rows);
        diffuse_evaporate_par(&field, &mut parallel, cols, rows, 0.2, 0.97);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_field_step_matches_free_function() {
        let values = random_field(10, 6, 21);
        let expected = diffuse_evaporate(&values, 10, 6, 0.3, 0.95);
        let mut field = PheromoneField::from_values(10, 6, 1.0, 100.0, values).unwrap();
        field.step(0.3, 0.95);
        assert_eq!(field.values(), expected.as_slice());

        let twice = diffuse_evaporate(&expected, 10, 6, 0.3, 0.95);
        field.step(0.3, 0.95);
        assert_eq!(field.values(), twice.as_slice());
    }

    #[test]
    fn test_field_rejects_bad_geometry() {
        assert_eq!(
            PheromoneField::from_values(3, 3, 1.0, 1.0, vec![0.0; 8]).unwrap_err(),
            KernelError::DimensionMismatch {
                cols: 3,
                rows: 3,
                len: 8
            }
        );
        assert!(matches!(
            PheromoneField::new(0, 3, 1.0, 1.0),
            Err(KernelError::EmptyGrid { .. })
        ));
        assert!(matches!(
            PheromoneField::new(3, 3, 0.0, 1.0),
            Err(KernelError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn test_field_world_access() {
        let mut field = PheromoneField::new(10, 10, 5.0, 1.0).unwrap();
        assert!(field.deposit_world(12.0, 7.5, 0.4));
        assert_eq!(field.read_at(2, 1), 0.4);
        assert_eq!(field.sample_world(14.9, 9.9), 0.4);
        assert!(!field.deposit_world(-0.1, 3.0, 0.4));
        assert_eq!(field.sample_world(50.0, 3.0), 0.0);
    }

    #[test]
    fn test_field_evaporate() {
        let mut field = PheromoneField::from_values(2, 2, 1.0, 10.0, vec![2.0; 4]).unwrap();
        field.evaporate(0.25);
        assert_eq!(field.values(), &[0.5; 4]);
    }

    #[test]
    fn test_map_routes_deposits_by_kind() {
        let mut map = PheromoneMap::new(8, 8, 10.0, 1.0).unwrap();
        let deposits = [
            PheromoneDeposit {
                x: 35.0,
                y: 35.0,
                kind: PheromoneKind::Food,
                amount: 0.5,
            },
            PheromoneDeposit {
                x: 15.0,
                y: 65.0,
                kind: PheromoneKind::Home,
                amount: 0.25,
            },
            PheromoneDeposit {
                x: 900.0,
                y: 5.0,
                kind: PheromoneKind::Home,
                amount: 1.0,
            },
        ];
        assert_eq!(map.apply_deposits(&deposits), 2);
        assert_eq!(map.layer(PheromoneKind::Food).read_at(3, 3), 0.5);
        assert_eq!(map.layer(PheromoneKind::Home).read_at(1, 6), 0.25);
        assert_eq!(map.layer(PheromoneKind::Food).read_at(1, 6), 0.0);

        map.step(0.0, 0.5);
        assert!((map.total() - 0.375).abs() < 1e-6);
    }
}
