use clap::Parser;
use std::time::Instant;
use swarmfield_core::pheromone::PheromoneField;
use swarmfield_core::spatial_hash::SpatialHash;
use swarmfield_core::{KernelConfig, KernelMetrics};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check kernel invariants for a configuration", long_about = None)]
struct Args {
    /// TOML configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Impulse deposited at the field center
    #[arg(short, long, default_value_t = 100.0)]
    impulse: f32,
}

#[derive(Debug, PartialEq)]
struct FieldReport {
    before: f32,
    after: f32,
    max_value: f32,
}

#[derive(Debug, PartialEq)]
struct IndexReport {
    entities: usize,
    cells: usize,
}

fn verify_field(
    config: &KernelConfig,
    impulse: f32,
    metrics: &KernelMetrics,
) -> anyhow::Result<FieldReport> {
    let f = &config.field;
    let mut field = PheromoneField::new(f.cols, f.rows, f.cell_size, f.max_level)?;
    let accepted = field.deposit((f.cols / 2) as i32, (f.rows / 2) as i32, impulse);
    metrics.record_deposit(accepted);
    anyhow::ensure!(accepted, "center deposit was rejected");

    let before = field.total();
    anyhow::ensure!(
        before <= f.max_level,
        "deposit exceeded max level: {before} > {}",
        f.max_level
    );

    let start = Instant::now();
    field.step(f.diffusion_rate, f.evaporation_rate);
    let after = field.total();
    metrics.record_field_step(start.elapsed(), after);

    let max_value = field.values().iter().copied().fold(0.0f32, f32::max);
    anyhow::ensure!(
        field.values().iter().all(|&v| v >= 0.0),
        "step produced a negative cell"
    );
    anyhow::ensure!(
        after <= before * f.evaporation_rate + 1e-3,
        "step kept more than the evaporated mass: {before} -> {after}"
    );
    if f.evaporation_rate == 1.0 && f.cols >= 5 && f.rows >= 5 {
        anyhow::ensure!(
            after > 0.95 * before,
            "interior impulse lost more than 5% of its mass: {before} -> {after}"
        );
    }

    Ok(FieldReport {
        before,
        after,
        max_value,
    })
}

fn verify_index(config: &KernelConfig, metrics: &KernelMetrics) -> anyhow::Result<IndexReport> {
    let cell_size = config.flock.hash_cell_size();
    let width = config.field.cols as f64 * config.field.cell_size;
    let height = config.field.rows as f64 * config.field.cell_size;
    let spacing = cell_size / 2.0;

    let nx = (width / spacing).ceil() as usize;
    let ny = (height / spacing).ceil() as usize;
    let positions: Vec<(f64, f64)> = (0..nx * ny)
        .map(|i| ((i % nx) as f64 * spacing, (i / nx) as f64 * spacing))
        .collect();

    let index = SpatialHash::try_build(&positions, cell_size)?;
    metrics.record_index_build(index.entity_count(), index.cell_count());

    anyhow::ensure!(
        index.all_entities().len() == positions.len(),
        "index lost entities"
    );
    for p in &positions {
        anyhow::ensure!(
            index.query(p).iter().any(|q| std::ptr::eq(*q, p)),
            "query around {p:?} did not return the entity itself"
        );
    }

    Ok(IndexReport {
        entities: index.entity_count(),
        cells: index.cell_count(),
    })
}

fn main() -> anyhow::Result<()> {
    swarmfield_core::init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => KernelConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => KernelConfig::default(),
    };
    let metrics = KernelMetrics::default();

    println!("Verifying kernel invariants (config {})", config.fingerprint());

    let field = verify_field(&config, args.impulse, &metrics)?;
    println!(
        "Field {}x{}: mass {:.4} -> {:.4} ({:.2}% retained), peak {:.4}",
        config.field.cols,
        config.field.rows,
        field.before,
        field.after,
        100.0 * field.after / field.before.max(f32::MIN_POSITIVE),
        field.max_value
    );

    let index = verify_index(&config, &metrics)?;
    println!(
        "Spatial hash: {} entities in {} cells (cell size {})",
        index.entities,
        index.cells,
        config.flock.hash_cell_size()
    );

    println!("\n✅ All invariants hold.");
    Ok(())
}
