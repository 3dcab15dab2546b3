//! Intensity Simulator
//!
//! Numerical simulation of optical intensity decay over the propagation
//! path of an underwater link. The attenuation coefficient is constant
//! along the path, and intensity follows dI/dz = -c·I from the transmitter
//! face to the far end of the link.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use water_optics::{attenuation_coefficient, AttenuationParameters, EnvironmentalData};

pub mod rk45;

use rk45::Rk45Options;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid propagation config {name}: {value} (must be {constraint})")]
    InvalidConfig {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
    #[error("Integration failed at {wavelength_nm} nm (c = {coefficient} 1/m): {source}")]
    IntegrationFailure {
        wavelength_nm: f64,
        coefficient: f64,
        #[source]
        source: rk45::Rk45Error,
    },
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Link geometry and calibration for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Link length z_max (m, > 0)
    pub max_distance_m: f64,
    /// Intensity at the transmitter face I0 (> 0)
    pub surface_intensity: f64,
    /// Receiver calibration factor h (> 0); applied by callers, never
    /// inside the ODE
    pub scale_factor: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_distance_m: 50.0,
            surface_intensity: 1.0,
            scale_factor: 1.0,
        }
    }
}

impl PropagationConfig {
    /// Check domain constraints before any simulation runs
    pub fn validate(&self) -> Result<()> {
        if !(self.max_distance_m > 0.0) {
            return Err(SimulationError::InvalidConfig {
                name: "max_distance_m",
                value: self.max_distance_m,
                constraint: "> 0",
            });
        }
        if !(self.surface_intensity > 0.0) {
            return Err(SimulationError::InvalidConfig {
                name: "surface_intensity",
                value: self.surface_intensity,
                constraint: "> 0",
            });
        }
        if !(self.scale_factor > 0.0) {
            return Err(SimulationError::InvalidConfig {
                name: "scale_factor",
                value: self.scale_factor,
                constraint: "> 0",
            });
        }
        Ok(())
    }
}

/// Intensity remaining at the far end of the link, before calibration.
///
/// Solves dI/dz = -c·I over [0, max_distance_m] with I(0) =
/// surface_intensity, where c is the attenuation coefficient at the given
/// wavelength. The `scale_factor` is deliberately not applied here.
pub fn simulate_intensity(
    wavelength_nm: f64,
    env: &EnvironmentalData,
    params: &AttenuationParameters,
    config: &PropagationConfig,
) -> Result<f64> {
    config.validate()?;

    let c = attenuation_coefficient(wavelength_nm, env, params);
    let opts = Rk45Options::default();
    let intensity = rk45::integrate(
        |_z, i| -c * i,
        0.0,
        config.surface_intensity,
        config.max_distance_m,
        &opts,
    )
    .map_err(|source| SimulationError::IntegrationFailure {
        wavelength_nm,
        coefficient: c,
        source,
    })?;

    // Round-off can leave a vanishing negative tail at extreme attenuation
    Ok(intensity.max(0.0))
}
