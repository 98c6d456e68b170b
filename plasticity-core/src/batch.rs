//! Parallel batch dispatch of the correction kernels.
//!
//! Scalar corrections are data-parallel over points; IBG is parallel over
//! nodes and sequential along each node's history. The material database is
//! the only shared state and is read-only. Results do not depend on how work
//! is split across threads.
//!
//! All shape and parameter checks run here, before any kernel starts.

use crate::blend::TemperatureBlend;
use crate::error::{Error, Result};
use crate::ibg::{correct_node_history, TensorCorrectionResult};
use crate::material::MaterialDatabase;
use crate::params::{CorrectionMethod, CorrectionParameters};
use crate::scalar::{glinka_point, neuber_point, PointCorrection, ScalarCorrectionResult};
use crate::types::StressTensor;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Run `job` on a dedicated pool of `n_threads` workers, or on the global
/// rayon pool when `n_threads == 0`.
fn run_in_pool<R, F>(n_threads: usize, job: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    if n_threads == 0 {
        return Ok(job());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;
    Ok(pool.install(job))
}

fn check_scalar_inputs(sigma_equivalent: &[f64], temperature: &[f64]) -> Result<()> {
    if sigma_equivalent.len() != temperature.len() {
        return Err(Error::ShapeMismatch(format!(
            "sigma_equivalent and temperature must match in length ({} vs {})",
            sigma_equivalent.len(),
            temperature.len()
        )));
    }
    Ok(())
}

fn check_history_inputs(stress_history: &[StressTensor], temperature_history: &[f64]) -> Result<()> {
    if stress_history.len() != temperature_history.len() {
        return Err(Error::ShapeMismatch(format!(
            "temperature history length must match stress history rows ({} vs {})",
            temperature_history.len(),
            stress_history.len()
        )));
    }
    Ok(())
}

/// Apply a per-point kernel over all points in parallel.
fn correct_points<F>(
    method: CorrectionMethod,
    sigma_equivalent: &[f64],
    temperature: &[f64],
    params: &CorrectionParameters,
    kernel: F,
) -> Result<ScalarCorrectionResult>
where
    F: Fn(f64, f64) -> PointCorrection + Sync + Send,
{
    check_scalar_inputs(sigma_equivalent, temperature)?;
    params.validate()?;

    debug!(
        method = method.name(),
        entries = sigma_equivalent.len(),
        threads = params.n_threads,
        "Running scalar plasticity correction"
    );

    let points: Vec<PointCorrection> = run_in_pool(params.n_threads, || {
        sigma_equivalent
            .par_iter()
            .zip(temperature.par_iter())
            .map(|(&sigma_e, &t)| kernel(sigma_e, t))
            .collect()
    })?;
    let result: ScalarCorrectionResult = points.into_iter().collect();

    let unconverged = result.unconverged_count();
    if unconverged > 0 {
        warn!(
            method = method.name(),
            unconverged,
            entries = result.len(),
            max_iterations = params.max_iterations,
            "Newton iteration did not converge; returning last iterate"
        );
    }
    Ok(result)
}

/// Apply the Neuber correction to an array of equivalent stresses.
///
/// # Arguments
///
/// * `sigma_equivalent` - Pseudo-elastic equivalent stress per point
/// * `temperature` - Temperature per point (same length)
/// * `material` - Hardening database
/// * `params` - Tolerance, iteration cap and extrapolation policy
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the arrays differ in length and
/// [`Error::InvalidParameters`] if `params` fails validation. Points that do
/// not converge are reported through [`ScalarCorrectionResult::converged`],
/// not as errors.
///
/// # Example
///
/// ```
/// use plasticity_core::{apply_neuber_correction, default_material_database, CorrectionParameters};
///
/// let material = default_material_database();
/// let result = apply_neuber_correction(&[500.0], &[22.0], &material, &CorrectionParameters::default()).unwrap();
/// assert!(result.corrected_stress[0] < 500.0);
/// assert!(result.plastic_strain[0] > 0.0);
/// ```
pub fn apply_neuber_correction(
    sigma_equivalent: &[f64],
    temperature: &[f64],
    material: &MaterialDatabase,
    params: &CorrectionParameters,
) -> Result<ScalarCorrectionResult> {
    let blend = TemperatureBlend::new(material, params.extrapolation);
    correct_points(CorrectionMethod::Neuber, sigma_equivalent, temperature, params, |s, t| {
        neuber_point(&blend, s, t, params.tolerance, params.max_iterations)
    })
}

/// Apply the Glinka energy-density correction to an array of equivalent
/// stresses.
///
/// Arguments and errors mirror [`apply_neuber_correction`].
pub fn apply_glinka_correction(
    sigma_equivalent: &[f64],
    temperature: &[f64],
    material: &MaterialDatabase,
    params: &CorrectionParameters,
) -> Result<ScalarCorrectionResult> {
    let blend = TemperatureBlend::new(material, params.extrapolation);
    correct_points(CorrectionMethod::Glinka, sigma_equivalent, temperature, params, |s, t| {
        glinka_point(&blend, s, t, params.tolerance, params.max_iterations)
    })
}

/// Apply the scalar correction selected by `method`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] for [`CorrectionMethod::Ibg`], which
/// needs full tensor histories; otherwise as [`apply_neuber_correction`].
pub fn apply_scalar_correction(
    method: CorrectionMethod,
    sigma_equivalent: &[f64],
    temperature: &[f64],
    material: &MaterialDatabase,
    params: &CorrectionParameters,
) -> Result<ScalarCorrectionResult> {
    match method {
        CorrectionMethod::Neuber => apply_neuber_correction(sigma_equivalent, temperature, material, params),
        CorrectionMethod::Glinka => apply_glinka_correction(sigma_equivalent, temperature, material, params),
        CorrectionMethod::Ibg => Err(Error::InvalidParameters(
            "IBG correction requires stress histories, not equivalent stresses".into(),
        )),
    }
}

/// Apply the IBG correction to one node's stress history.
///
/// # Arguments
///
/// * `stress_history` - Pseudo-elastic stress per step, Voigt order
/// * `temperature_history` - Temperature per step (same length)
/// * `material` - Hardening database
/// * `params` - Extrapolation policy and Poisson's ratio
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the histories differ in length.
pub fn apply_ibg_correction(
    stress_history: &[StressTensor],
    temperature_history: &[f64],
    material: &MaterialDatabase,
    params: &CorrectionParameters,
) -> Result<TensorCorrectionResult> {
    check_history_inputs(stress_history, temperature_history)?;
    params.validate()?;

    debug!(steps = stress_history.len(), "Running IBG correction");
    let blend = TemperatureBlend::new(material, params.extrapolation);
    Ok(correct_node_history(
        &blend,
        stress_history,
        temperature_history,
        params.poisson_ratio,
    ))
}

/// Apply the IBG correction to many nodes in parallel.
///
/// Output order matches input order.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the number of stress and temperature
/// histories differ, or any node's histories differ in length.
pub fn apply_ibg_correction_nodes(
    stress_histories: &[Vec<StressTensor>],
    temperature_histories: &[Vec<f64>],
    material: &MaterialDatabase,
    params: &CorrectionParameters,
) -> Result<Vec<TensorCorrectionResult>> {
    if stress_histories.len() != temperature_histories.len() {
        return Err(Error::ShapeMismatch(format!(
            "one temperature history per node required ({} stress histories, {} temperature histories)",
            stress_histories.len(),
            temperature_histories.len()
        )));
    }
    for (node, (stress, temps)) in stress_histories.iter().zip(temperature_histories).enumerate() {
        check_history_inputs(stress, temps).map_err(|e| match e {
            Error::ShapeMismatch(msg) => Error::ShapeMismatch(format!("node {node}: {msg}")),
            other => other,
        })?;
    }
    params.validate()?;

    debug!(
        nodes = stress_histories.len(),
        steps = stress_histories.first().map_or(0, Vec::len),
        threads = params.n_threads,
        "Running IBG correction over nodes"
    );

    let blend = TemperatureBlend::new(material, params.extrapolation);
    run_in_pool(params.n_threads, || {
        stress_histories
            .par_iter()
            .zip(temperature_histories.par_iter())
            .map(|(stress, temps)| correct_node_history(&blend, stress, temps, params.poisson_ratio))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::default_material_database;

    #[test]
    fn test_scalar_shape_mismatch() {
        let db = default_material_database();
        let params = CorrectionParameters::default();
        let result = apply_neuber_correction(&[100.0, 200.0], &[22.0], &db, &params);
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
        let result = apply_glinka_correction(&[100.0], &[], &db, &params);
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_invalid_parameters_rejected_before_run() {
        let db = default_material_database();
        let params = CorrectionParameters::default().with_max_iterations(0);
        let result = apply_neuber_correction(&[500.0], &[22.0], &db, &params);
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_empty_batch() {
        let db = default_material_database();
        let result = apply_glinka_correction(&[], &[], &db, &CorrectionParameters::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scalar_dispatch_by_method() {
        let db = default_material_database();
        let params = CorrectionParameters::default();
        let direct = apply_glinka_correction(&[650.0], &[22.0], &db, &params).unwrap();
        let selected =
            apply_scalar_correction(CorrectionMethod::Glinka, &[650.0], &[22.0], &db, &params).unwrap();
        assert_eq!(direct, selected);
        assert!(apply_scalar_correction(CorrectionMethod::Ibg, &[650.0], &[22.0], &db, &params).is_err());
    }

    #[test]
    fn test_ibg_shape_mismatch() {
        let db = default_material_database();
        let params = CorrectionParameters::default();
        let history = vec![StressTensor::zero(); 3];
        let result = apply_ibg_correction(&history, &[22.0, 22.0], &db, &params);
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));

        let result = apply_ibg_correction_nodes(&[history.clone()], &[], &db, &params);
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));

        let result = apply_ibg_correction_nodes(&[history], &[vec![22.0; 2]], &db, &params);
        match result {
            Err(Error::ShapeMismatch(msg)) => assert!(msg.starts_with("node 0")),
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_dedicated_pool_matches_global() {
        let db = default_material_database();
        let sigma: Vec<f64> = (0..200).map(|i| 5.0 * i as f64).collect();
        let temps = vec![22.0; sigma.len()];
        let global = apply_neuber_correction(&sigma, &temps, &db, &CorrectionParameters::default()).unwrap();
        let pooled = apply_neuber_correction(
            &sigma,
            &temps,
            &db,
            &CorrectionParameters::default().with_threads(3),
        )
        .unwrap();
        assert_eq!(global, pooled);
    }
}
