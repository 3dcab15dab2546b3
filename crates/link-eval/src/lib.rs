//! Link Evaluator
//!
//! Sweeps candidate wavelengths through the intensity simulator, selects
//! the argmax of received intensity, and judges the link against a
//! caller-supplied threshold.
//!
//! The sweep grid is inclusive of both window endpoints; ties at the
//! maximum keep the first (lowest-wavelength) sample. A failed sample
//! aborts the whole sweep instead of skipping the point, since a curve
//! with a hole would yield a misleading optimum.

use intensity_sim::{simulate_intensity, PropagationConfig, SimulationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use water_optics::{AttenuationParameters, EnvironmentalData, OpticsError};

pub mod report;

/// Default sweep window (nm)
pub const DEFAULT_RANGE_LO_NM: f64 = 400.0;
pub const DEFAULT_RANGE_HI_NM: f64 = 600.0;
/// Default number of sweep samples
pub const DEFAULT_NUM_POINTS: usize = 100;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid wavelength range: {lo_nm}..{hi_nm} nm (lo must be below hi)")]
    InvalidRange { lo_nm: f64, hi_nm: f64 },
    #[error("Invalid sample count: {0} (need at least 1)")]
    InvalidSampleCount(usize),
    #[error(transparent)]
    Optics(#[from] OpticsError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Inclusive sweep window in nanometres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthRange {
    pub lo_nm: f64,
    pub hi_nm: f64,
}

impl Default for WavelengthRange {
    fn default() -> Self {
        Self {
            lo_nm: DEFAULT_RANGE_LO_NM,
            hi_nm: DEFAULT_RANGE_HI_NM,
        }
    }
}

impl WavelengthRange {
    pub fn new(lo_nm: f64, hi_nm: f64) -> Self {
        Self { lo_nm, hi_nm }
    }

    /// A window must be non-degenerate and ascending
    pub fn validate(&self) -> Result<()> {
        if !(self.lo_nm < self.hi_nm) {
            return Err(LinkError::InvalidRange {
                lo_nm: self.lo_nm,
                hi_nm: self.hi_nm,
            });
        }
        Ok(())
    }

    /// Grid spacing for an n-point sweep (0 for a single point)
    pub fn spacing(&self, num_points: usize) -> f64 {
        if num_points > 1 {
            (self.hi_nm - self.lo_nm) / (num_points - 1) as f64
        } else {
            0.0
        }
    }
}

/// One point on the intensity-vs-wavelength curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensitySample {
    pub wavelength_nm: f64,
    /// Calibrated intensity at the receiver
    pub intensity: f64,
}

/// Optimizer output: the sampled curve plus its argmax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthSweep {
    pub optimal_wavelength_nm: f64,
    /// Samples in ascending wavelength order
    pub samples: Vec<IntensitySample>,
}

/// Final link verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEvaluation {
    pub optimal_wavelength_nm: f64,
    /// Calibrated intensity received at the optimal wavelength
    pub received_intensity: f64,
    /// Whether the received intensity clears the caller's threshold
    pub meets_threshold: bool,
    /// The full sweep, in ascending wavelength order, for plotting
    pub samples: Vec<IntensitySample>,
}

/// Evenly spaced inclusive grid over the window; a single-point sweep
/// degenerates to the lower bound.
fn wavelength_grid(range: &WavelengthRange, num_points: usize) -> Vec<f64> {
    if num_points == 1 {
        return vec![range.lo_nm];
    }
    let step = range.spacing(num_points);
    (0..num_points)
        .map(|i| {
            if i == num_points - 1 {
                range.hi_nm
            } else {
                range.lo_nm + step * i as f64
            }
        })
        .collect()
}

/// Sweep the wavelength window and pick the argmax of received intensity.
pub fn find_optimal_wavelength(
    env: &EnvironmentalData,
    params: &AttenuationParameters,
    config: &PropagationConfig,
    range: &WavelengthRange,
    num_points: usize,
) -> Result<WavelengthSweep> {
    env.validate()?;
    params.validate()?;
    config.validate()?;
    range.validate()?;
    if num_points < 1 {
        return Err(LinkError::InvalidSampleCount(num_points));
    }

    let mut samples: Vec<IntensitySample> = Vec::with_capacity(num_points);
    let mut best_index = 0;

    for (i, wavelength_nm) in wavelength_grid(range, num_points).into_iter().enumerate() {
        let intensity =
            config.scale_factor * simulate_intensity(wavelength_nm, env, params, config)?;
        debug!("Sampled {:.2} nm: intensity {:.6}", wavelength_nm, intensity);
        samples.push(IntensitySample {
            wavelength_nm,
            intensity,
        });
        // Strict comparison keeps the first maximum on ties
        if intensity > samples[best_index].intensity {
            best_index = i;
        }
    }

    Ok(WavelengthSweep {
        optimal_wavelength_nm: samples[best_index].wavelength_nm,
        samples,
    })
}

/// Evaluate the link end to end with the default sweep window.
pub fn evaluate_link(
    env: &EnvironmentalData,
    params: &AttenuationParameters,
    config: &PropagationConfig,
    threshold: f64,
) -> Result<LinkEvaluation> {
    evaluate_link_with_sweep(
        env,
        params,
        config,
        &WavelengthRange::default(),
        DEFAULT_NUM_POINTS,
        threshold,
    )
}

/// Evaluate the link with an explicit sweep window.
pub fn evaluate_link_with_sweep(
    env: &EnvironmentalData,
    params: &AttenuationParameters,
    config: &PropagationConfig,
    range: &WavelengthRange,
    num_points: usize,
    threshold: f64,
) -> Result<LinkEvaluation> {
    let sweep = find_optimal_wavelength(env, params, config, range, num_points)?;

    // The received figure is recomputed at the optimum rather than read
    // back from the sweep; both calls are deterministic with identical
    // inputs, so the two values agree bit for bit.
    let received_intensity =
        config.scale_factor * simulate_intensity(sweep.optimal_wavelength_nm, env, params, config)?;
    let meets_threshold = received_intensity >= threshold;

    info!(
        "Optimal wavelength {:.2} nm, received intensity {:.4} (threshold {:.4})",
        sweep.optimal_wavelength_nm, received_intensity, threshold
    );

    Ok(LinkEvaluation {
        optimal_wavelength_nm: sweep.optimal_wavelength_nm,
        received_intensity,
        meets_threshold,
        samples: sweep.samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_env() -> EnvironmentalData {
        EnvironmentalData::new(20.0, 35.0, 1.0)
    }

    #[test]
    fn test_grid_includes_both_endpoints() {
        let range = WavelengthRange::default();
        let grid = wavelength_grid(&range, 100);

        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], 400.0);
        assert_eq!(grid[99], 600.0);

        let step = range.spacing(100);
        for pair in grid.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_point_grid_is_lower_bound() {
        let grid = wavelength_grid(&WavelengthRange::new(400.0, 600.0), 1);
        assert_eq!(grid, vec![400.0]);
    }

    #[test]
    fn test_single_point_sweep_is_trivially_optimal() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let sweep =
            find_optimal_wavelength(&env, &params, &config, &WavelengthRange::default(), 1)
                .unwrap();
        assert_eq!(sweep.samples.len(), 1);
        assert_eq!(sweep.optimal_wavelength_nm, 400.0);
    }

    #[test]
    fn test_tie_break_keeps_lowest_wavelength() {
        // No scattering and zero turbidity: the coefficient is symmetric
        // around 450 nm, so 440 and 460 nm attenuate identically
        let env = EnvironmentalData::new(20.0, 35.0, 0.0);
        let params = AttenuationParameters::new(0.05, 0.0);
        let config = PropagationConfig::default();

        let sweep =
            find_optimal_wavelength(&env, &params, &config, &WavelengthRange::new(440.0, 460.0), 2)
                .unwrap();
        assert_eq!(sweep.samples[0].intensity, sweep.samples[1].intensity);
        assert_eq!(sweep.optimal_wavelength_nm, 440.0);
    }

    #[test]
    fn test_samples_ascend_in_wavelength() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let sweep = find_optimal_wavelength(
            &env,
            &params,
            &config,
            &WavelengthRange::default(),
            25,
        )
        .unwrap();
        for pair in sweep.samples.windows(2) {
            assert!(pair[0].wavelength_nm < pair[1].wavelength_nm);
        }
    }

    #[test]
    fn test_optimum_tracks_turbidity_shift() {
        // Clear water: absorption minimum sits at 450 nm and scattering is
        // gone, so the sweep optimum lands on the closest grid point
        let env = EnvironmentalData::new(20.0, 35.0, 0.0);
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();
        let range = WavelengthRange::default();

        let sweep = find_optimal_wavelength(&env, &params, &config, &range, 100).unwrap();
        let spacing = range.spacing(100);
        assert!(
            (sweep.optimal_wavelength_nm - 450.0).abs() <= spacing,
            "optimum {} nm not within one spacing of 450 nm",
            sweep.optimal_wavelength_nm
        );
    }

    #[test]
    fn test_invalid_sample_count() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let err =
            find_optimal_wavelength(&env, &params, &config, &WavelengthRange::default(), 0)
                .unwrap_err();
        assert!(matches!(err, LinkError::InvalidSampleCount(0)));
    }

    #[test]
    fn test_degenerate_range_rejected() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        for range in [
            WavelengthRange::new(500.0, 500.0),
            WavelengthRange::new(600.0, 400.0),
        ] {
            let err = find_optimal_wavelength(&env, &params, &config, &range, 10).unwrap_err();
            assert!(matches!(err, LinkError::InvalidRange { .. }));
        }
    }

    #[test]
    fn test_invalid_inputs_rejected_before_sweeping() {
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let bad_env = EnvironmentalData::new(20.0, 35.0, -1.0);
        let err = find_optimal_wavelength(
            &bad_env,
            &params,
            &config,
            &WavelengthRange::default(),
            10,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Optics(_)));

        let bad_config = PropagationConfig {
            max_distance_m: -5.0,
            ..Default::default()
        };
        let err = find_optimal_wavelength(
            &scenario_env(),
            &params,
            &bad_config,
            &WavelengthRange::default(),
            10,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Simulation(_)));
    }

    #[test]
    fn test_received_intensity_matches_sweep_sample() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let evaluation = evaluate_link(&env, &params, &config, 0.05).unwrap();
        let at_optimum = evaluation
            .samples
            .iter()
            .find(|s| s.wavelength_nm == evaluation.optimal_wavelength_nm)
            .expect("optimum must be one of the samples");
        assert_eq!(evaluation.received_intensity, at_optimum.intensity);
    }

    #[test]
    fn test_scale_factor_multiplies_samples() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let raw = PropagationConfig::default();
        let scaled = PropagationConfig {
            scale_factor: 3.0,
            ..raw
        };

        let base = evaluate_link(&env, &params, &raw, 0.05).unwrap();
        let boosted = evaluate_link(&env, &params, &scaled, 0.05).unwrap();

        assert_eq!(base.optimal_wavelength_nm, boosted.optimal_wavelength_nm);
        assert!(
            (boosted.received_intensity - 3.0 * base.received_intensity).abs() < 1e-12,
            "scaled {} vs base {}",
            boosted.received_intensity,
            base.received_intensity
        );
    }

    #[test]
    fn test_threshold_verdict() {
        let env = scenario_env();
        let params = AttenuationParameters::default();
        let config = PropagationConfig::default();

        let generous = evaluate_link(&env, &params, &config, 0.0).unwrap();
        assert!(generous.meets_threshold);

        let strict = evaluate_link(&env, &params, &config, 1.0).unwrap();
        assert!(!strict.meets_threshold);
        // Threshold only flips the verdict, never the numbers
        assert_eq!(
            generous.received_intensity,
            strict.received_intensity
        );
    }
}
