//! Underwater Optical Link Evaluation CLI
//!
//! Finds the wavelength that maximizes received intensity for the given
//! water conditions and link geometry, and reports whether the link clears
//! the signal threshold.
//!
//! Usage:
//!   evaluate-link --turbidity 1.0 --z-max 50 --threshold 0.05 \
//!                 --output link_report.json

use anyhow::Result;
use clap::Parser;
use intensity_sim::PropagationConfig;
use link_eval::report::{self, LinkReport, ReportInputs};
use link_eval::{evaluate_link_with_sweep, WavelengthRange, DEFAULT_NUM_POINTS};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use water_optics::{optimal_absorption_wavelength, AttenuationParameters, EnvironmentalData};

#[derive(Parser, Debug)]
#[command(
    name = "evaluate-link",
    about = "Find the optimal wavelength for an underwater optical link"
)]
struct Args {
    /// Water temperature (Celsius)
    #[arg(long, default_value_t = 20.0)]
    temperature: f64,

    /// Salinity (PSU)
    #[arg(long, default_value_t = 35.0)]
    salinity: f64,

    /// Turbidity (NTU)
    #[arg(long, default_value_t = 1.0)]
    turbidity: f64,

    /// Baseline absorption a0 (1/m)
    #[arg(long, default_value_t = 0.05)]
    a0: f64,

    /// Baseline scattering b0 (1/m)
    #[arg(long, default_value_t = 0.02)]
    b0: f64,

    /// Propagation distance z_max (m)
    #[arg(long, default_value_t = 50.0)]
    z_max: f64,

    /// Intensity at the transmitter face
    #[arg(long, default_value_t = 1.0)]
    surface_intensity: f64,

    /// Receiver calibration factor h
    #[arg(long, default_value_t = 1.0)]
    scale_factor: f64,

    /// Minimum acceptable received intensity
    #[arg(long, default_value_t = 0.05)]
    threshold: f64,

    /// Sweep window lower bound (nm)
    #[arg(long, default_value_t = 400.0)]
    range_lo: f64,

    /// Sweep window upper bound (nm)
    #[arg(long, default_value_t = 600.0)]
    range_hi: f64,

    /// Number of sweep samples
    #[arg(long, default_value_t = DEFAULT_NUM_POINTS)]
    num_points: usize,

    /// Write a JSON report (full intensity curve included) to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let env = EnvironmentalData::new(args.temperature, args.salinity, args.turbidity);
    let params = AttenuationParameters::new(args.a0, args.b0);
    let config = PropagationConfig {
        max_distance_m: args.z_max,
        surface_intensity: args.surface_intensity,
        scale_factor: args.scale_factor,
    };
    let range = WavelengthRange::new(args.range_lo, args.range_hi);

    info!("{}", "=".repeat(60));
    info!("Underwater Optical Link Evaluator");
    info!("{}", "=".repeat(60));
    info!("Temperature: {:.2} C", env.temperature_c);
    info!("Salinity:    {:.2} PSU", env.salinity_psu);
    info!("Turbidity:   {:.2} NTU", env.turbidity_ntu);
    info!(
        "Absorption minimum: {:.1} nm",
        optimal_absorption_wavelength(env.turbidity_ntu)
    );
    info!(
        "Sweeping {:.0}..{:.0} nm over {} samples, z_max {:.1} m",
        range.lo_nm, range.hi_nm, args.num_points, config.max_distance_m
    );

    let evaluation =
        evaluate_link_with_sweep(&env, &params, &config, &range, args.num_points, args.threshold)?;

    info!("Optimal wavelength: {:.2} nm", evaluation.optimal_wavelength_nm);
    info!("Received intensity: {:.4}", evaluation.received_intensity);
    if evaluation.meets_threshold {
        info!("Signal strength sufficient (threshold {:.4})", args.threshold);
    } else {
        info!(
            "Signal strength low (threshold {:.4}), consider adjusting parameters",
            args.threshold
        );
    }

    if let Some(path) = args.output {
        info!("Writing report to {:?}", path);
        let report = LinkReport::new(
            ReportInputs {
                env,
                params,
                config,
                range,
                num_points: args.num_points,
                threshold: args.threshold,
            },
            evaluation,
        );
        report::write_report(&path, &report)?;
    }

    Ok(())
}
