//! Water Optics Library
//!
//! Wavelength-dependent attenuation model for underwater optical links.
//! Combines a turbidity-shifted absorption minimum with turbidity-driven
//! scattering into a single attenuation coefficient (1/m):
//!
//! ```text
//! c(λ) = a0 + 5e-5 · (λ − λ_opt)²  +  b0 · turbidity² · (λ / 500)
//! ```
//!
//! where `λ_opt = 450 + min(turbidity · 10, 100)` nm is the wavelength of
//! minimum absorption for the given turbidity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpticsError {
    #[error("Invalid parameter {name}: {value} (must be {constraint})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, OpticsError>;

/// Clear-water absorption minimum (nm)
pub const LAMBDA_BASE_NM: f64 = 450.0;
/// Red-shift of the absorption minimum per NTU of turbidity (nm)
pub const LAMBDA_SHIFT_PER_NTU: f64 = 10.0;
/// Saturation of the turbidity red-shift (nm)
pub const LAMBDA_SHIFT_MAX_NM: f64 = 100.0;
/// Quadratic absorption penalty away from the minimum (1/m per nm²)
pub const ABSORPTION_CURVATURE: f64 = 5e-5;
/// Reference wavelength for scattering normalization (nm)
pub const SCATTERING_REF_NM: f64 = 500.0;

/// Water column conditions at the link site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    /// Water temperature (Celsius)
    pub temperature_c: f64,
    /// Salinity (PSU)
    pub salinity_psu: f64,
    /// Turbidity (NTU, >= 0)
    pub turbidity_ntu: f64,
}

impl Default for EnvironmentalData {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            salinity_psu: 35.0,
            turbidity_ntu: 1.0,
        }
    }
}

impl EnvironmentalData {
    pub fn new(temperature_c: f64, salinity_psu: f64, turbidity_ntu: f64) -> Self {
        Self {
            temperature_c,
            salinity_psu,
            turbidity_ntu,
        }
    }

    /// Check domain constraints before any simulation runs
    pub fn validate(&self) -> Result<()> {
        if !(self.turbidity_ntu >= 0.0) {
            return Err(OpticsError::InvalidParameter {
                name: "turbidity_ntu",
                value: self.turbidity_ntu,
                constraint: ">= 0",
            });
        }
        Ok(())
    }
}

/// Baseline absorption and scattering of the water body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationParameters {
    /// Baseline absorption a0 (1/m, > 0)
    pub baseline_absorption: f64,
    /// Baseline scattering b0 (1/m, >= 0)
    pub baseline_scattering: f64,
}

impl Default for AttenuationParameters {
    fn default() -> Self {
        Self {
            baseline_absorption: 0.05,
            baseline_scattering: 0.02,
        }
    }
}

impl AttenuationParameters {
    pub fn new(baseline_absorption: f64, baseline_scattering: f64) -> Self {
        Self {
            baseline_absorption,
            baseline_scattering,
        }
    }

    /// Check domain constraints before any simulation runs
    pub fn validate(&self) -> Result<()> {
        if !(self.baseline_absorption > 0.0) {
            return Err(OpticsError::InvalidParameter {
                name: "baseline_absorption",
                value: self.baseline_absorption,
                constraint: "> 0",
            });
        }
        if !(self.baseline_scattering >= 0.0) {
            return Err(OpticsError::InvalidParameter {
                name: "baseline_scattering",
                value: self.baseline_scattering,
                constraint: ">= 0",
            });
        }
        Ok(())
    }
}

/// Wavelength of minimum absorption for the given turbidity (nm).
///
/// Turbid water red-shifts the minimum; the shift saturates at
/// [`LAMBDA_SHIFT_MAX_NM`], so the result stays in [450, 550] nm for any
/// turbidity >= 0.
pub fn optimal_absorption_wavelength(turbidity_ntu: f64) -> f64 {
    LAMBDA_BASE_NM + (turbidity_ntu * LAMBDA_SHIFT_PER_NTU).min(LAMBDA_SHIFT_MAX_NM)
}

/// Absorption term a(λ) (1/m): quadratic penalty around the absorption
/// minimum, floored at the baseline.
pub fn absorption(
    wavelength_nm: f64,
    env: &EnvironmentalData,
    params: &AttenuationParameters,
) -> f64 {
    let lambda_opt = optimal_absorption_wavelength(env.turbidity_ntu);
    params.baseline_absorption + ABSORPTION_CURVATURE * (wavelength_nm - lambda_opt).powi(2)
}

/// Scattering term b(λ) (1/m): quadratic in turbidity, linear in
/// wavelength normalized to the reference.
pub fn scattering(
    wavelength_nm: f64,
    env: &EnvironmentalData,
    params: &AttenuationParameters,
) -> f64 {
    params.baseline_scattering * env.turbidity_ntu.powi(2) * (wavelength_nm / SCATTERING_REF_NM)
}

/// Total attenuation coefficient c = a + b (1/m)
pub fn attenuation_coefficient(
    wavelength_nm: f64,
    env: &EnvironmentalData,
    params: &AttenuationParameters,
) -> f64 {
    absorption(wavelength_nm, env, params) + scattering(wavelength_nm, env, params)
}
