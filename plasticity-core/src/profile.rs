//! Adapters from loader-level material and temperature data.
//!
//! A [`MaterialProfile`] holds hardening curves as they come from a material
//! file: one curve per temperature, each on its own plastic-strain grid, plus
//! a separate Young's modulus table. [`MaterialProfile::build_database`] puts
//! every curve on a common strain grid and produces a validated
//! [`MaterialDatabase`].
//!
//! A [`TemperatureField`] maps node ids to temperatures and produces the
//! per-node temperature arrays the correction kernels consume.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::material::MaterialDatabase;
use crate::params::DEFAULT_POISSON_RATIO;
use crate::types::EPS;

/// Upper clamp for a supplied Poisson's ratio.
const MAX_POISSON_RATIO: f64 = 0.4999;

/// Number of missing node ids quoted in error messages.
const MISSING_PREVIEW: usize = 5;

/// One tabulated hardening curve.
#[derive(Debug, Clone, PartialEq)]
pub struct HardeningCurve {
    /// Curve temperature.
    pub temperature: f64,
    /// True stress per point.
    pub stress: Vec<f64>,
    /// Plastic strain per point (strictly increasing).
    pub plastic_strain: Vec<f64>,
}

impl HardeningCurve {
    /// Create a curve.
    pub fn new(temperature: f64, stress: Vec<f64>, plastic_strain: Vec<f64>) -> Self {
        Self { temperature, stress, plastic_strain }
    }

    fn validate(&self) -> Result<()> {
        let t = self.temperature;
        if self.stress.len() != self.plastic_strain.len() {
            return Err(Error::InvalidMaterial(format!(
                "stress/strain length mismatch for plastic curve at {t} °C"
            )));
        }
        if self.stress.len() < 2 {
            return Err(Error::InvalidMaterial(format!(
                "plastic curve at {t} °C must have at least two points"
            )));
        }
        if self.plastic_strain.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::InvalidMaterial(format!(
                "plastic strain values must be strictly increasing for temperature {t} °C"
            )));
        }
        Ok(())
    }
}

/// Temperature-dependent material data as supplied by a material file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialProfile {
    /// Hardening curves, in any temperature order.
    pub curves: Vec<HardeningCurve>,
    /// `(temperature, Young's modulus)` samples, in any order.
    pub youngs_modulus: Vec<(f64, f64)>,
    /// Poisson's ratio samples.
    pub poisson_ratio: Vec<f64>,
}

impl MaterialProfile {
    /// Empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hardening curve.
    pub fn with_curve(mut self, curve: HardeningCurve) -> Self {
        self.curves.push(curve);
        self
    }

    /// Add a Young's modulus sample.
    pub fn with_youngs_modulus(mut self, temperature: f64, modulus: f64) -> Self {
        self.youngs_modulus.push((temperature, modulus));
        self
    }

    /// Add a Poisson's ratio sample.
    pub fn with_poisson_ratio(mut self, ratio: f64) -> Self {
        self.poisson_ratio.push(ratio);
        self
    }

    /// Whether the profile contains any data.
    pub fn has_data(&self) -> bool {
        !self.curves.is_empty() || !self.youngs_modulus.is_empty() || !self.poisson_ratio.is_empty()
    }

    /// Build the hardening database.
    ///
    /// Curves are sorted by temperature. The curve with the most points
    /// defines the common plastic-strain grid; curves on a different grid are
    /// resampled onto it. Young's modulus is interpolated at each curve
    /// temperature.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingData`] if there are no curves or no Young's modulus
    ///   samples.
    /// - [`Error::InvalidMaterial`] for malformed curves or if the assembled
    ///   tables fail [`MaterialDatabase::new`].
    pub fn build_database(&self) -> Result<MaterialDatabase> {
        if !self.has_data() {
            return Err(Error::MissingData(
                "material profile is empty; plasticity correction cannot proceed".into(),
            ));
        }
        if self.curves.is_empty() {
            return Err(Error::MissingData(
                "material profile does not contain any plastic curves".into(),
            ));
        }
        for curve in &self.curves {
            curve.validate()?;
        }

        let mut curves: Vec<&HardeningCurve> = self.curves.iter().collect();
        curves.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));

        // First curve with the most points wins ties.
        let mut grid = &curves[0].plastic_strain;
        for curve in &curves[1..] {
            if curve.plastic_strain.len() > grid.len() {
                grid = &curve.plastic_strain;
            }
        }

        let stress_rows: Vec<Vec<f64>> = curves
            .iter()
            .map(|curve| {
                if same_grid(&curve.plastic_strain, grid) {
                    curve.stress.clone()
                } else {
                    resample(&curve.plastic_strain, &curve.stress, grid)
                }
            })
            .collect();
        let strain_rows = vec![grid.clone(); curves.len()];

        if self.youngs_modulus.is_empty() {
            return Err(Error::MissingData(
                "Young's modulus table is required for plasticity correction".into(),
            ));
        }
        let mut modulus = self.youngs_modulus.clone();
        modulus.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (mod_temps, mod_values): (Vec<f64>, Vec<f64>) = modulus.into_iter().unzip();

        let temperatures: Vec<f64> = curves.iter().map(|c| c.temperature).collect();
        let youngs: Vec<f64> = temperatures
            .iter()
            .map(|&t| interp_clamped(t, &mod_temps, &mod_values))
            .collect();

        MaterialDatabase::new(temperatures, youngs, stress_rows, strain_rows)
    }

    /// Representative Poisson's ratio.
    ///
    /// Mean of the supplied samples clamped to [0, 0.4999], or `default` when
    /// none are supplied.
    pub fn poisson_ratio_or(&self, default: f64) -> f64 {
        if self.poisson_ratio.is_empty() {
            return default;
        }
        let mean = self.poisson_ratio.iter().sum::<f64>() / self.poisson_ratio.len() as f64;
        mean.clamp(0.0, MAX_POISSON_RATIO)
    }

    /// Representative Poisson's ratio, falling back to 0.30.
    pub fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio_or(DEFAULT_POISSON_RATIO)
    }
}

/// Element-wise closeness: |a − b| ≤ 1e-8 + 1e-5·|b|.
fn same_grid(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-8 + 1e-5 * y.abs())
}

/// Piecewise-linear interpolation clamped to the end values.
///
/// `xs` must be sorted ascending and non-empty.
fn interp_clamped(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let upper = xs.partition_point(|&v| v <= x);
    let lower = upper - 1;
    let (x0, x1) = (xs[lower], xs[upper]);
    let (y0, y1) = (ys[lower], ys[upper]);
    if x1 == x0 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Resample `stress(strain)` onto `target`, extrapolating linearly past both
/// ends with the slopes of the end segments.
fn resample(strain: &[f64], stress: &[f64], target: &[f64]) -> Vec<f64> {
    let n = strain.len();
    let low_slope = (stress[1] - stress[0]) / (strain[1] - strain[0] + EPS);
    let high_slope = (stress[n - 1] - stress[n - 2]) / (strain[n - 1] - strain[n - 2] + EPS);

    target
        .iter()
        .map(|&x| {
            if x < strain[0] {
                stress[0] + low_slope * (x - strain[0])
            } else if x > strain[n - 1] {
                stress[n - 1] + high_slope * (x - strain[n - 1])
            } else {
                interp_clamped(x, strain, stress)
            }
        })
        .collect()
}

/// Temperatures keyed by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureField {
    values: HashMap<i64, f64>,
}

impl TemperatureField {
    /// Build a field from parallel node-id and temperature arrays.
    ///
    /// Later duplicates of a node id override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the arrays differ in length.
    pub fn new(node_ids: &[i64], temperatures: &[f64]) -> Result<Self> {
        if node_ids.len() != temperatures.len() {
            return Err(Error::ShapeMismatch(format!(
                "temperature field has {} node ids but {} values",
                node_ids.len(),
                temperatures.len()
            )));
        }
        Ok(Self {
            values: node_ids.iter().copied().zip(temperatures.iter().copied()).collect(),
        })
    }

    /// Number of nodes with a temperature.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Temperature of one node, if present.
    pub fn get(&self, node_id: i64) -> Option<f64> {
        self.values.get(&node_id).copied()
    }

    /// Temperatures aligned with `node_ids`.
    ///
    /// Nodes absent from the field take `default_temperature` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingData`] naming the missing nodes when any node
    /// is absent and no default is supplied.
    pub fn map_to_nodes(&self, node_ids: &[i64], default_temperature: Option<f64>) -> Result<Vec<f64>> {
        let mut missing = Vec::new();
        let mapped: Vec<f64> = node_ids
            .iter()
            .map(|&id| match (self.get(id), default_temperature) {
                (Some(t), _) => t,
                (None, Some(fallback)) => fallback,
                (None, None) => {
                    missing.push(id);
                    f64::NAN
                }
            })
            .collect();

        if !missing.is_empty() {
            let preview: Vec<String> = missing.iter().take(MISSING_PREVIEW).map(i64::to_string).collect();
            return Err(Error::MissingData(format!(
                "temperature values are missing for {} node(s): {} ...",
                missing.len(),
                preview.join(", ")
            )));
        }
        Ok(mapped)
    }
}
