use std::{fs::File, io::Write, time::Instant};

use log::{info, warn};

use roundtrip_mt_core::{Result, SolverInput, SolverOptions, Tour, logging, solve_roundtrip};

const METRICS_OUTLIER_FACTOR: f64 = 10.0;

fn main() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;
    let input = SolverInput::load(&options)?;

    info!("input: {input}");
    info!("options: {options}");
    for diagnostic in &input.diagnostics {
        warn!(
            "input: skipped line {}: {}",
            diagnostic.line, diagnostic.message
        );
    }

    let tour = solve_roundtrip(input, options.clone())?;

    write_route(&tour, &options)?;

    info!(
        "output: n={} tour_m={:.0} time={:.2}s",
        tour.waypoints.len(),
        tour.length_m,
        now.elapsed().as_secs_f32()
    );

    tour.metrics(METRICS_OUTLIER_FACTOR);

    Ok(())
}

fn write_route(tour: &Tour, options: &SolverOptions) -> Result<()> {
    match options.output_path() {
        Some(path) => {
            let mut file = File::create(path)?;
            for waypoint in tour.closed() {
                writeln!(file, "{waypoint}")?;
            }
        }
        None => {
            for waypoint in tour.closed() {
                println!("{waypoint}");
            }
        }
    }
    Ok(())
}
