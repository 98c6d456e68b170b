//! Scalar (equivalent-stress) corrections: Neuber and Glinka.
//!
//! Both rules map a pseudo-elastic equivalent stress σe to the stress σ a
//! yielding material would carry, at the local temperature:
//!
//! ```text
//! Neuber:  σ/E + εp(T,σ)       = σe²/(σ E)        (stress × total strain)
//! Glinka:  σ²/(2E) + Up(T,σ)   = σe²/(2E)         (strain energy density)
//! ```
//!
//! Each point is solved independently with [`newton::solve_positive`] seeded at
//! `min(σe, σy(T))`. Non-positive σe short-circuits to zero stress and strain.
//! Neuber stops on the relative step only, with σe ≤ σy(T) returned as is;
//! Glinka also stops on a small residual.

use crate::blend::TemperatureBlend;
use crate::newton::{self, NewtonOutcome, StopRule};
use crate::types::EPS;

/// Corrected state of one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCorrection {
    /// Corrected equivalent stress.
    pub stress: f64,
    /// Plastic strain at the corrected stress.
    pub plastic_strain: f64,
    /// Newton iterations spent (0 on the non-positive fast path).
    pub iterations: usize,
    /// Whether the Newton iteration converged.
    pub converged: bool,
}

impl PointCorrection {
    /// Unloaded point.
    fn zero() -> Self {
        Self::elastic(0.0)
    }

    /// Point at or below yield.
    fn elastic(stress: f64) -> Self {
        Self { stress, plastic_strain: 0.0, iterations: 0, converged: true }
    }

    fn from_outcome(blend: &TemperatureBlend<'_>, temperature: f64, outcome: NewtonOutcome) -> Self {
        Self {
            stress: outcome.root,
            plastic_strain: blend.plastic_strain(temperature, outcome.root),
            iterations: outcome.iterations,
            converged: outcome.converged,
        }
    }
}

/// Corrected stresses and plastic strains for a batch of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarCorrectionResult {
    /// Corrected equivalent stress per point.
    pub corrected_stress: Vec<f64>,
    /// Plastic strain per point.
    pub plastic_strain: Vec<f64>,
    /// Per-point convergence flag.
    pub converged: Vec<bool>,
}

impl ScalarCorrectionResult {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.corrected_stress.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.corrected_stress.is_empty()
    }

    /// Points whose iteration hit the cap without converging.
    pub fn unconverged_count(&self) -> usize {
        self.converged.iter().filter(|c| !**c).count()
    }

    /// Largest plastic strain in the batch.
    pub fn max_plastic_strain(&self) -> f64 {
        self.plastic_strain.iter().copied().fold(0.0, f64::max)
    }
}

impl FromIterator<PointCorrection> for ScalarCorrectionResult {
    fn from_iter<I: IntoIterator<Item = PointCorrection>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut result = Self {
            corrected_stress: Vec::with_capacity(lower),
            plastic_strain: Vec::with_capacity(lower),
            converged: Vec::with_capacity(lower),
        };
        for point in iter {
            result.corrected_stress.push(point.stress);
            result.plastic_strain.push(point.plastic_strain);
            result.converged.push(point.converged);
        }
        result
    }
}

/// Neuber correction of one point.
pub fn neuber_point(
    blend: &TemperatureBlend<'_>,
    sigma_e: f64,
    temperature: f64,
    tolerance: f64,
    max_iterations: usize,
) -> PointCorrection {
    if sigma_e <= 0.0 {
        return PointCorrection::zero();
    }
    let sigma_y = blend.yield_stress(temperature);
    if sigma_e <= sigma_y {
        return PointCorrection::elastic(sigma_e);
    }
    let e = blend.young_modulus(temperature);

    // Residual in units of the elastic strain σe/E.
    let strain_scale = sigma_e / e + EPS;
    let residual = |sigma: f64| {
        let total_strain = sigma / e + blend.plastic_strain(temperature, sigma);
        (total_strain - sigma_e * sigma_e / (sigma * e + EPS)) / strain_scale
    };

    let outcome = newton::solve_positive(sigma_y, tolerance, max_iterations, StopRule::StepOnly, residual);
    PointCorrection::from_outcome(blend, temperature, outcome)
}

/// Glinka correction of one point.
pub fn glinka_point(
    blend: &TemperatureBlend<'_>,
    sigma_e: f64,
    temperature: f64,
    tolerance: f64,
    max_iterations: usize,
) -> PointCorrection {
    if sigma_e <= 0.0 {
        return PointCorrection::zero();
    }
    let e = blend.young_modulus(temperature);
    let target = sigma_e * sigma_e / (2.0 * e + EPS);
    let seed = sigma_e.min(blend.yield_stress(temperature));

    // Residual relative to the elastic energy density.
    let energy_scale = target + EPS;
    let residual = |sigma: f64| {
        let energy = sigma * sigma / (2.0 * e + EPS) + blend.plastic_energy(temperature, sigma);
        (energy - target) / energy_scale
    };

    let outcome =
        newton::solve_positive(seed, tolerance, max_iterations, StopRule::StepOrResidual, residual);
    PointCorrection::from_outcome(blend, temperature, outcome)
}
