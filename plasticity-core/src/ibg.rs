//! Incremental Buczynski-Glinka (IBG) correction of tensor stress histories.
//!
//! The corrector walks one node's pseudo-elastic history in time order,
//! carrying the accumulated equivalent plastic strain from step to step. At
//! each step:
//!
//! 1. ΔUe: deviatoric elastic energy increment from the previous step.
//! 2. Elastic fast path while both steps stay below yield and no plastic
//!    strain has accumulated.
//! 3. Δεp from `ΔUe = ∫ σ_flow dεp` with a midpoint rule (fixed passes).
//! 4. A scalar contraction of the deviatoric stress, coupled to the flow
//!    stress at the current plastic strain (fixed passes).
//! 5. Deviatoric-only radial scaling, so the mean stress is untouched.
//!
//! Nodes are independent; see [`crate::batch`] for parallel dispatch.

use crate::blend::TemperatureBlend;
use crate::types::{delta_elastic_energy_deviatoric, StressTensor, EPS};

/// Midpoint refinements of the plastic strain increment.
const MIDPOINT_PASSES: usize = 3;

/// Passes coupling the contraction factor to the corrected stress.
const SCALE_PASSES: usize = 2;

/// Lower bound on flow-stress denominators.
const MIN_DENOMINATOR: f64 = 1e-9;

/// Corrected history of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorCorrectionResult {
    /// Corrected stress per step.
    pub corrected: Vec<StressTensor>,
    /// Cumulative equivalent plastic strain per step.
    pub plastic_strain: Vec<f64>,
}

impl TensorCorrectionResult {
    /// Number of history steps.
    pub fn n_steps(&self) -> usize {
        self.corrected.len()
    }

    /// Von Mises stress of each corrected step.
    pub fn corrected_von_mises(&self) -> Vec<f64> {
        self.corrected.iter().map(|s| s.von_mises()).collect()
    }

    /// Plastic strain gained at each step (zero at the first step).
    pub fn plastic_strain_increments(&self) -> Vec<f64> {
        let mut increments = Vec::with_capacity(self.plastic_strain.len());
        let mut previous = 0.0;
        for &epsp in &self.plastic_strain {
            increments.push(epsp - previous);
            previous = epsp;
        }
        increments
    }

    /// Accumulated plastic strain at the end of the history.
    pub fn final_plastic_strain(&self) -> f64 {
        self.plastic_strain.last().copied().unwrap_or(0.0)
    }
}

/// Plastic strain increment absorbing `delta_energy` from `epsp_prev`.
///
/// Seeds with the yield stress, then refines `Δεp = ΔUe / σ_flow(εp + Δεp/2)`.
pub fn plastic_strain_increment(
    blend: &TemperatureBlend<'_>,
    delta_energy: f64,
    temperature: f64,
    epsp_prev: f64,
) -> f64 {
    if delta_energy <= 0.0 {
        return 0.0;
    }
    let sigma_y = blend.yield_stress(temperature);
    let mut depsp = delta_energy / sigma_y.max(MIN_DENOMINATOR);
    for _ in 0..MIDPOINT_PASSES {
        let s_mid = blend.stress(temperature, epsp_prev + 0.5 * depsp);
        if s_mid <= 0.0 {
            break;
        }
        depsp = delta_energy / (s_mid + EPS);
    }
    depsp.max(0.0)
}

/// Correct one node's stress history.
///
/// `history` and `temperatures` must have equal length; the batch entry points
/// check this before dispatch. The first step is always taken as elastic.
pub fn correct_node_history(
    blend: &TemperatureBlend<'_>,
    history: &[StressTensor],
    temperatures: &[f64],
    poisson_ratio: f64,
) -> TensorCorrectionResult {
    debug_assert_eq!(history.len(), temperatures.len());
    let n_steps = history.len();
    let mut result = TensorCorrectionResult {
        corrected: Vec::with_capacity(n_steps),
        plastic_strain: Vec::with_capacity(n_steps),
    };
    let Some(first) = history.first() else {
        return result;
    };

    let vm_elastic: Vec<f64> = history.iter().map(|s| s.von_mises()).collect();

    result.corrected.push(*first);
    result.plastic_strain.push(0.0);
    let mut epsp = 0.0;

    for k in 1..n_steps {
        let temperature = temperatures[k];
        let e = blend.young_modulus(temperature);
        let delta_energy =
            delta_elastic_energy_deviatoric(&history[k - 1], &history[k], e, poisson_ratio);

        let below_yield = vm_elastic[k - 1].max(vm_elastic[k]) <= blend.yield_stress(temperature);
        if below_yield && epsp <= 0.0 {
            result.corrected.push(history[k]);
            result.plastic_strain.push(epsp);
            continue;
        }

        let depsp = plastic_strain_increment(blend, delta_energy.max(0.0), temperature, epsp);

        let flow = blend.stress(temperature, epsp);
        let mut scale = 1.0;
        for _ in 0..SCALE_PASSES {
            let denom = (scale * vm_elastic[k]).max(flow).max(MIN_DENOMINATOR);
            scale = 1.0 / (1.0 + e * depsp / denom);
        }

        epsp += depsp;
        result.plastic_strain.push(epsp);
        result.corrected.push(history[k].scale_deviatoric(scale));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ExtrapolationPolicy;
    use crate::material::default_material_database;
    use approx::assert_relative_eq;

    const NU: f64 = 0.3;

    fn ramp(peak: f64, n: usize) -> Vec<StressTensor> {
        (0..n)
            .map(|i| {
                let s = peak * i as f64 / (n - 1) as f64;
                StressTensor::new([s, 0.25 * s, -0.1 * s, 0.2 * s, 0.0, 0.05 * s])
            })
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let result = correct_node_history(&blend, &[], &[], NU);
        assert_eq!(result.n_steps(), 0);
        assert_eq!(result.final_plastic_strain(), 0.0);
    }

    #[test]
    fn test_elastic_history_unchanged() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let history = ramp(300.0, 8);
        let temps = vec![22.0; history.len()];
        let result = correct_node_history(&blend, &history, &temps, NU);
        assert_eq!(result.corrected, history);
        assert!(result.plastic_strain.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_first_step_always_elastic() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let history = vec![StressTensor::uniaxial(900.0), StressTensor::uniaxial(950.0)];
        let result = correct_node_history(&blend, &history, &[22.0, 22.0], NU);
        assert_eq!(result.corrected[0], history[0]);
        assert_eq!(result.plastic_strain[0], 0.0);
    }

    #[test]
    fn test_yielding_history_contracts_deviator() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let history = ramp(900.0, 20);
        let temps = vec![22.0; history.len()];
        let result = correct_node_history(&blend, &history, &temps, NU);

        assert!(result.final_plastic_strain() > 0.0);
        for (k, (corr, orig)) in result.corrected.iter().zip(&history).enumerate() {
            assert_relative_eq!(corr.hydrostatic(), orig.hydrostatic(), epsilon = 1e-9);
            assert!(corr.von_mises() <= orig.von_mises() + 1e-9, "step {k}");
        }
    }

    #[test]
    fn test_corrected_von_mises_per_step() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let history: Vec<StressTensor> = (0..12).map(|k| StressTensor::uniaxial(80.0 * k as f64)).collect();
        let temps = vec![22.0; history.len()];
        let result = correct_node_history(&blend, &history, &temps, NU);

        let vm = result.corrected_von_mises();
        assert_eq!(vm.len(), history.len());
        for (k, corr) in result.corrected.iter().enumerate() {
            assert_relative_eq!(vm[k], corr.von_mises(), epsilon = 1e-12);
        }
        // Elastic up to yield, relaxed below the pseudo-elastic value after.
        assert_relative_eq!(vm[5], 400.0, max_relative = 1e-12);
        assert!(vm[11] < 880.0);
        assert!(vm[11] > 400.0);
    }

    #[test]
    fn test_plastic_strain_is_cumulative() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let mut history = ramp(900.0, 10);
        // Unload back to zero.
        history.extend(ramp(900.0, 10).into_iter().rev());
        let temps = vec![22.0; history.len()];
        let result = correct_node_history(&blend, &history, &temps, NU);

        let increments = result.plastic_strain_increments();
        assert_eq!(increments[0], 0.0);
        assert!(increments.iter().all(|&d| d >= 0.0));
        // No plastic strain is gained while unloading.
        assert!(increments[10..].iter().all(|&d| d == 0.0));
        assert_relative_eq!(
            increments.iter().sum::<f64>(),
            result.final_plastic_strain(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_increment_uses_flow_stress() {
        let db = default_material_database();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        assert_eq!(plastic_strain_increment(&blend, 0.0, 22.0, 0.0), 0.0);
        assert_eq!(plastic_strain_increment(&blend, -1.0, 22.0, 0.0), 0.0);

        // Small increments on a nearly flat part of the curve approach ΔU/σy.
        let d = plastic_strain_increment(&blend, 1e-6, 22.0, 0.0);
        assert_relative_eq!(d, 1e-6 / 400.0, max_relative = 1e-6);

        // Further along the curve the flow stress is higher.
        let later = plastic_strain_increment(&blend, 1e-6, 22.0, 0.2);
        assert!(later < d);
    }
}
