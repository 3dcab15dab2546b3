//! JSON report export for downstream plotting and logging.
//!
//! The report carries the full intensity-vs-wavelength curve so a front
//! end can render it together with a marker at the optimal wavelength; the
//! core itself stays headless.

use crate::{LinkEvaluation, Result, WavelengthRange};
use intensity_sim::PropagationConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use water_optics::{optimal_absorption_wavelength, AttenuationParameters, EnvironmentalData};

/// Inputs echoed into the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInputs {
    pub env: EnvironmentalData,
    pub params: AttenuationParameters,
    pub config: PropagationConfig,
    pub range: WavelengthRange,
    pub num_points: usize,
    pub threshold: f64,
}

/// Serializable record of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReport {
    pub inputs: ReportInputs,
    /// Absorption-minimum wavelength for the input turbidity (nm)
    pub theoretical_optimum_nm: f64,
    pub evaluation: LinkEvaluation,
    /// RFC 3339 timestamp; report metadata only, never part of the
    /// evaluation itself
    pub generated_at: String,
}

impl LinkReport {
    pub fn new(inputs: ReportInputs, evaluation: LinkEvaluation) -> Self {
        let theoretical_optimum_nm = optimal_absorption_wavelength(inputs.env.turbidity_ntu);
        Self {
            inputs,
            theoretical_optimum_nm,
            evaluation,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Write a pretty-printed JSON report
pub fn write_report(path: &Path, report: &LinkReport) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
