use anyhow::{Context, Result};
use clap::Parser;
use lenia_common::{LeniaConfig, OutputConfig, OutputFormat, Snapshot};
use log::{debug, error, info, trace, warn};
use particle_lenia::trajectory::frame_extent;
use particle_lenia::{
    capture_snapshot, field_grid, integrate_observed, uniform_square, GradientMethod, Vec2,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Command-line arguments for the simulation driver
#[derive(Parser, Debug)]
#[command(author, version, about = "Particle Lenia simulation engine", long_about = None)]
struct Args {
    /// Path to the config.toml file (the reference rotor run is used if it does not exist)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of integration steps
    #[arg(long)]
    steps: Option<usize>,

    /// Override the initial placement seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the base filename for all outputs
    #[arg(long)]
    output_base: Option<String>,

    /// Differentiate the energy with dual numbers instead of the closed-form gradient
    #[arg(long)]
    dual: bool,
}

fn load_config(args: &Args) -> Result<LeniaConfig> {
    let mut config = if args.config.exists() {
        LeniaConfig::load(&args.config)?
    } else {
        warn!(
            "Config file '{}' not found. Using the reference rotor configuration.",
            args.config.display()
        );
        LeniaConfig::default()
    };

    if let Some(steps) = args.steps {
        config.timing.n_steps = steps;
    }
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = seed;
    }
    if let Some(base) = &args.output_base {
        config.output.base_filename = base.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Particle Lenia...");
    let args = Args::parse();

    // --- Load Configuration ---
    let config = load_config(&args)?;
    let params = config.params;
    let dt = config.timing.dt;
    let total_steps = config.timing.n_steps;
    let record_interval_steps = config.record_interval_steps();
    let method = if args.dual { GradientMethod::Dual } else { GradientMethod::Analytic };

    info!("Using {} Rayon threads.", rayon::current_num_threads());
    debug!("Simulation Parameters: {:#?}", params);

    // --- Initial Placement ---
    let ic = &config.initial_conditions;
    let initial = uniform_square(ic.num_particles as usize, ic.half_width, ic.seed)?;
    info!(
        "Placed {} particles in [-{}, {}]^2 (seed {}).",
        initial.len(),
        ic.half_width,
        ic.half_width,
        ic.seed
    );

    let include_positions = config.output.positions_in_snapshots;
    let mut snapshots = vec![capture_snapshot(&params, 0, dt, &initial, include_positions)];
    info!(
        "Recording snapshot every {} steps ({:.2} time units).",
        record_interval_steps,
        record_interval_steps as f64 * dt
    );

    // --- Simulation Loop ---
    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let mut step_start_time = start_time;
    let mut divergence_reported = false;
    let print_interval_secs = 5.0;

    let observer = |step: usize, positions: &[Vec2]| {
        let step_duration = step_start_time.elapsed();
        let current_time = Instant::now();
        let should_print_status =
            current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_step = step % record_interval_steps == 0;
        let is_last_step = step == total_steps;

        if !divergence_reported && !positions.iter().all(Vec2::is_finite) {
            warn!(
                "Non-finite positions appeared at step {}. Integration continues; \
                 results past this point are meaningless.",
                step
            );
            divergence_reported = true;
        }

        if is_record_step || is_last_step {
            let snapshot = capture_snapshot(&params, step, dt, positions, include_positions);
            debug!("Recorded snapshot at step {} (mean E = {:.6}).", step, snapshot.mean_energy);
            snapshots.push(snapshot);
        }

        if should_print_status || is_last_step {
            let mean_energy = snapshots.last().map(|s| s.mean_energy).unwrap_or(f64::NAN);
            info!(
                "Step [{}/{}] (t = {:.2}) | Mean E: {:.6} | Step Time: {:6.2} ms | \
                 Elapsed: {:.2} s",
                step,
                total_steps,
                step as f64 * dt,
                mean_energy,
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;
        } else {
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                step,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
        step_start_time = Instant::now();
    };
    let trajectory = integrate_observed(&params, &initial, dt, total_steps, method, observer)?;

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds ({} frames).",
        total_duration.as_secs_f64(),
        trajectory.len()
    );
    if let Some(extent) = trajectory.extent() {
        info!("Trajectory extent: {:.3}", extent);
    }

    // --- Save Recorded Data ---
    let output = &config.output;
    let final_positions = trajectory.last().unwrap_or(initial.as_slice());

    if output.save_snapshots {
        save_snapshots(&snapshots, output)?;
    } else {
        info!("Skipping saving snapshots as per config (save_snapshots is false).");
    }

    if output.save_final_positions {
        save_final_positions(final_positions, output)?;
    } else {
        info!("Skipping saving final positions as per config.");
    }

    if output.field_grid_resolution > 0 {
        save_field_grid(&config, final_positions)?;
    }

    info!("Simulation Complete.");
    Ok(())
}

fn save_snapshots(snapshots: &[Snapshot], output: &OutputConfig) -> Result<()> {
    let format = output.output_format().unwrap_or_else(|| {
        error!("Unknown output format: {}. Using JSON instead.", output.format);
        OutputFormat::Json
    });
    let filename = format!("{}_snapshots.{}", output.base_filename, format.extension());
    let file = File::create(&filename)
        .with_context(|| format!("Error creating snapshot file '{}'", filename))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => serde_json::to_writer(&mut writer, snapshots)
            .context("Error serializing snapshots to JSON")?,
        OutputFormat::Bincode => bincode::serialize_into(&mut writer, snapshots)
            .context("Error serializing snapshots to bincode")?,
        OutputFormat::MessagePack => rmp_serde::encode::write(&mut writer, snapshots)
            .context("Error serializing snapshots to MessagePack")?,
    }
    writer.flush()?;
    info!("{} snapshots saved to {} ({:?} format)", snapshots.len(), filename, format);
    Ok(())
}

fn save_final_positions(positions: &[Vec2], output: &OutputConfig) -> Result<()> {
    let filename = format!("{}_final_positions.csv", output.base_filename);
    let mut writer = csv::Writer::from_path(&filename)
        .with_context(|| format!("Error creating CSV file '{}'", filename))?;
    writer.write_record(["x", "y"])?;
    for p in positions {
        writer.write_record(&[format!("{:.6}", p.x), format!("{:.6}", p.y)])?;
    }
    writer.flush()?;
    info!("Final positions saved to {}", filename);
    Ok(())
}

fn save_field_grid(config: &LeniaConfig, positions: &[Vec2]) -> Result<()> {
    let resolution = config.output.field_grid_resolution;
    // A frame collapsed onto the origin still gets a unit view.
    let extent = match frame_extent(positions) {
        e if e > 0.0 => e,
        _ => 1.0,
    };
    let grid = field_grid(&config.params, positions, extent, resolution)?;

    let filename = format!("{}_field_grid.csv", config.output.base_filename);
    let mut writer = csv::Writer::from_path(&filename)
        .with_context(|| format!("Error creating CSV file '{}'", filename))?;
    writer.write_record(["ix", "iy", "x", "y", "u", "g", "r", "e"])?;
    for (ix, iy, point, f) in grid.iter() {
        writer.write_record(&[
            ix.to_string(),
            iy.to_string(),
            format!("{:.6}", point.x),
            format!("{:.6}", point.y),
            format!("{:.8e}", f.u),
            format!("{:.8e}", f.g),
            format!("{:.8e}", f.r),
            format!("{:.8e}", f.e),
        ])?;
    }
    writer.flush()?;
    info!("Field grid ({}x{}, extent {:.3}) saved to {}", resolution, resolution, extent, filename);
    Ok(())
}
