pub use swarmfield_core::{config, equilibrium, error, metrics, pheromone, spatial_hash, steering};
pub use swarmfield_data::reaction;

pub use swarmfield_core::{
    KernelConfig, KernelError, KernelMetrics, PheromoneDeposit, PheromoneField, PheromoneKind,
    PheromoneMap, SpatialHash,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser-facing handle around a single [`PheromoneField`].
///
/// The canvas host deposits from its own agent loop, calls `step` once per
/// frame and paints from `values`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct WasmPheromoneField {
    field: PheromoneField,
    metrics: KernelMetrics,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl WasmPheromoneField {
    #[wasm_bindgen(constructor)]
    pub fn new(
        cols: usize,
        rows: usize,
        cell_size: f64,
        max_level: f32,
    ) -> Result<WasmPheromoneField, JsValue> {
        console_error_panic_hook::set_once();

        let field = PheromoneField::new(cols, rows, cell_size, max_level)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        web_sys::console::log_1(&JsValue::from_str(&format!(
            "pheromone field {cols}x{rows} ready"
        )));

        Ok(WasmPheromoneField {
            field,
            metrics: KernelMetrics::default(),
        })
    }

    /// Builds a field from a TOML configuration string.
    pub fn from_config(toml: &str) -> Result<WasmPheromoneField, JsValue> {
        let config =
            KernelConfig::from_toml(toml).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let f = &config.field;
        Self::new(f.cols, f.rows, f.cell_size, f.max_level)
    }

    pub fn step(&mut self, diffusion_rate: f32, evaporation_rate: f32) {
        let start = web_time::Instant::now();
        self.field.step(diffusion_rate, evaporation_rate);
        self.metrics.record_field_step(start.elapsed(), self.field.total());
    }

    pub fn evaporate(&mut self, evaporation_rate: f32) {
        self.field.evaporate(evaporation_rate);
    }

    pub fn deposit(&mut self, x: i32, y: i32, amount: f32) -> bool {
        let accepted = self.field.deposit(x, y, amount);
        self.metrics.record_deposit(accepted);
        accepted
    }

    pub fn deposit_world(&mut self, world_x: f64, world_y: f64, amount: f32) -> bool {
        let accepted = self.field.deposit_world(world_x, world_y, amount);
        self.metrics.record_deposit(accepted);
        accepted
    }

    pub fn read_at(&self, x: i32, y: i32) -> f32 {
        self.field.read_at(x, y)
    }

    pub fn total(&self) -> f32 {
        self.field.total()
    }

    pub fn cols(&self) -> usize {
        self.field.cols()
    }

    pub fn rows(&self) -> usize {
        self.field.rows()
    }

    /// Copy of the current grid, row-major.
    pub fn values(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.field.values())
    }

    pub fn get_stats(&self) -> js_sys::Object {
        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(
            &obj,
            &JsValue::from_str("steps"),
            &JsValue::from_f64(self.metrics.field_steps() as f64),
        );
        let _ = js_sys::Reflect::set(
            &obj,
            &JsValue::from_str("rejectedDeposits"),
            &JsValue::from_f64(self.metrics.deposits_rejected() as f64),
        );
        let _ = js_sys::Reflect::set(
            &obj,
            &JsValue::from_str("mass"),
            &JsValue::from_f64(self.field.total() as f64),
        );
        let _ = js_sys::Reflect::set(
            &obj,
            &JsValue::from_str("uptimeMs"),
            &JsValue::from_f64(self.metrics.elapsed().as_secs_f64() * 1000.0),
        );
        obj
    }
}

/// Row-major `[x0, y0, x1, y1, ...]` pairs into positions; a trailing odd
/// value is ignored.
#[must_use]
pub fn positions_from_flat(flat: &[f64]) -> Vec<(f64, f64)> {
    flat.chunks_exact(2).map(|p| (p[0], p[1])).collect()
}

struct Indexed {
    id: u32,
    x: f64,
    y: f64,
}

impl swarmfield_core::Positioned for Indexed {
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Indices into `positions` of every candidate in the 3x3 block around
/// `(x, y)`, in bucket order.
#[must_use]
pub fn candidate_indices(positions: &[(f64, f64)], x: f64, y: f64, cell_size: f64) -> Vec<u32> {
    let indexed: Vec<Indexed> = positions
        .iter()
        .enumerate()
        .map(|(i, &(px, py))| Indexed {
            id: i as u32,
            x: px,
            y: py,
        })
        .collect();
    let index = SpatialHash::build(&indexed, cell_size);
    index.query_point(x, y).into_iter().map(|e| e.id).collect()
}

/// Neighbor candidates for the browser host over a flat position buffer.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn query_candidates(flat_positions: &[f64], x: f64, y: f64, cell_size: f64) -> Vec<u32> {
    candidate_indices(&positions_from_flat(flat_positions), x, y, cell_size)
}
