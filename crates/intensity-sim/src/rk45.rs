//! Adaptive Dormand–Prince 5(4) integrator for scalar first-order ODEs.
//!
//! Embedded fourth/fifth-order pair: a step is accepted when the embedded
//! error estimate falls inside the mixed absolute/relative tolerance, and
//! the step size is rescaled by the usual fifth-root rule either way.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rk45Error {
    #[error("Step size collapsed to {step:e} at z = {at}")]
    StepSizeUnderflow { at: f64, step: f64 },
    #[error("Step budget exhausted after {0} steps")]
    StepBudgetExhausted(usize),
}

pub type Result<T> = std::result::Result<T, Rk45Error>;

/// Integrator tolerances and step limits
#[derive(Debug, Clone, Copy)]
pub struct Rk45Options {
    /// Relative tolerance on the local error
    pub rel_tol: f64,
    /// Absolute tolerance on the local error. The default is a bare
    /// divide-by-zero guard: a decaying intensity never reaches zero, and
    /// any larger floor would take over the error scale once the solution
    /// drops below abs_tol / rel_tol, silently degrading deep-decay
    /// endpoints to absolute accuracy only.
    pub abs_tol: f64,
    /// Hard limit on attempted steps
    pub max_steps: usize,
    /// First trial step; defaults to 1/100 of the span
    pub initial_step: Option<f64>,
}

impl Default for Rk45Options {
    fn default() -> Self {
        Self {
            rel_tol: 1e-10,
            abs_tol: 1e-300,
            max_steps: 100_000,
            initial_step: None,
        }
    }
}

// Dormand-Prince tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order solution weights
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference against the embedded fourth-order solution
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const FACTOR_MIN: f64 = 0.2;
const FACTOR_MAX: f64 = 5.0;

/// Integrate dy/dz = f(z, y) from (z0, y0) to z_end, returning y(z_end).
pub fn integrate<F>(f: F, z0: f64, y0: f64, z_end: f64, opts: &Rk45Options) -> Result<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let span = z_end - z0;
    if span == 0.0 {
        return Ok(y0);
    }
    let direction = span.signum();
    let min_step = span.abs() * f64::EPSILON * 16.0;

    let mut z = z0;
    let mut y = y0;
    let mut h = opts.initial_step.unwrap_or(span / 100.0);
    let mut steps = 0;

    while (z_end - z) * direction > 0.0 {
        steps += 1;
        if steps > opts.max_steps {
            return Err(Rk45Error::StepBudgetExhausted(opts.max_steps));
        }
        if h.abs() < min_step {
            return Err(Rk45Error::StepSizeUnderflow { at: z, step: h });
        }
        // Never overshoot the endpoint; a clamped step is the last one
        let last = (z + h - z_end) * direction >= 0.0;
        if last {
            h = z_end - z;
        }

        let k1 = f(z, y);
        let k2 = f(z + C2 * h, y + h * (A21 * k1));
        let k3 = f(z + C3 * h, y + h * (A31 * k1 + A32 * k2));
        let k4 = f(z + C4 * h, y + h * (A41 * k1 + A42 * k2 + A43 * k3));
        let k5 = f(z + C5 * h, y + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4));
        let k6 = f(
            z + h,
            y + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
        );

        let y_next = y + h * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
        let k7 = f(z + h, y_next);

        let err = h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
        let scale = opts.abs_tol + opts.rel_tol * y.abs().max(y_next.abs());
        let err_norm = (err / scale).abs();

        if err_norm <= 1.0 {
            z += h;
            y = y_next;
            if last {
                break;
            }
        }

        let factor = if err_norm > 0.0 {
            SAFETY * err_norm.powf(-0.2)
        } else {
            FACTOR_MAX
        };
        h *= factor.clamp(FACTOR_MIN, FACTOR_MAX);
    }

    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay_matches_closed_form() {
        let c = 0.3;
        let y = integrate(|_z, y| -c * y, 0.0, 1.0, 10.0, &Rk45Options::default()).unwrap();
        let exact = (-c * 10.0_f64).exp();
        assert!(
            ((y - exact) / exact).abs() < 1e-8,
            "y = {}, exact = {}",
            y,
            exact
        );
    }

    #[test]
    fn test_strong_decay_stays_accurate() {
        // c * z_max ~ 40: endpoint value around 4e-18
        let c = 0.8;
        let y = integrate(|_z, y| -c * y, 0.0, 1.0, 50.0, &Rk45Options::default()).unwrap();
        let exact = (-c * 50.0_f64).exp();
        assert!(((y - exact) / exact).abs() < 1e-6, "y = {}, exact = {}", y, exact);
    }

    #[test]
    fn test_deep_decay_keeps_relative_accuracy() {
        // Endpoint near 3.7e-44, far below any sensible absolute floor;
        // step control must stay on the relative scale the whole way down
        let c = 2.0;
        let y = integrate(|_z, y| -c * y, 0.0, 1.0, 50.0, &Rk45Options::default()).unwrap();
        let exact = (-c * 50.0_f64).exp();
        assert!(
            ((y - exact) / exact).abs() < 1e-6,
            "y = {:e}, exact = {:e}",
            y,
            exact
        );
    }

    #[test]
    fn test_nonautonomous_rhs() {
        // y' = cos(z), y(0) = 0 -> y(z) = sin(z)
        let y = integrate(|z, _y| z.cos(), 0.0, 0.0, 2.0, &Rk45Options::default()).unwrap();
        assert!((y - 2.0_f64.sin()).abs() < 1e-8, "y = {}", y);
    }

    #[test]
    fn test_growth_direction() {
        let y = integrate(|_z, y| y, 0.0, 1.0, 3.0, &Rk45Options::default()).unwrap();
        let exact = 3.0_f64.exp();
        assert!(((y - exact) / exact).abs() < 1e-8);
    }

    #[test]
    fn test_zero_span_returns_initial_value() {
        let y = integrate(|_z, y| -y, 2.0, 0.5, 2.0, &Rk45Options::default()).unwrap();
        assert_eq!(y, 0.5);
    }

    #[test]
    fn test_step_budget_exhausted() {
        let opts = Rk45Options {
            max_steps: 3,
            ..Default::default()
        };
        let err = integrate(|_z, y| -y, 0.0, 1.0, 1000.0, &opts).unwrap_err();
        assert_eq!(err, Rk45Error::StepBudgetExhausted(3));
    }
}
