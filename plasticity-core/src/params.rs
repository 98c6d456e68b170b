//! Correction parameters.

use crate::curve::ExtrapolationPolicy;
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Poisson's ratio used when the material profile supplies none.
pub const DEFAULT_POISSON_RATIO: f64 = 0.30;

/// Correction method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CorrectionMethod {
    /// Neuber rule on equivalent stress.
    #[default]
    Neuber,
    /// Glinka strain-energy-density rule on equivalent stress.
    Glinka,
    /// Incremental Buczynski-Glinka on full tensor histories.
    Ibg,
}

impl CorrectionMethod {
    /// Whether the method needs a time history per node rather than one
    /// equivalent stress per point.
    pub fn requires_history(&self) -> bool {
        matches!(self, Self::Ibg)
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neuber => "Neuber",
            Self::Glinka => "Glinka",
            Self::Ibg => "Incremental Buczynski-Glinka (IBG)",
        }
    }
}

/// Numerical controls shared by all correction methods.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorrectionParameters {
    /// Relative convergence tolerance for the Newton iterations.
    pub tolerance: f64,
    /// Iteration cap for the Newton iterations.
    pub max_iterations: usize,
    /// Curve behaviour past the last tabulated point.
    pub extrapolation: ExtrapolationPolicy,
    /// Isotropic Poisson's ratio (IBG shear modulus).
    pub poisson_ratio: f64,
    /// Temperature assigned to nodes missing from a temperature field.
    pub default_temperature: Option<f64>,
    /// Worker threads for batch dispatch (0 = rayon global pool).
    pub n_threads: usize,
}

impl Default for CorrectionParameters {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 60,
            extrapolation: ExtrapolationPolicy::LinearExtrapolate,
            poisson_ratio: DEFAULT_POISSON_RATIO,
            default_temperature: None,
            n_threads: 0,
        }
    }
}

impl CorrectionParameters {
    /// Set the relative tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the extrapolation policy.
    pub fn with_extrapolation(mut self, extrapolation: ExtrapolationPolicy) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Set Poisson's ratio.
    pub fn with_poisson_ratio(mut self, poisson_ratio: f64) -> Self {
        self.poisson_ratio = poisson_ratio;
        self
    }

    /// Set the fallback temperature for unmapped nodes.
    pub fn with_default_temperature(mut self, temperature: f64) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Run batches on a dedicated pool of `n_threads` workers.
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// Check that every parameter lies in its domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] for a non-positive tolerance, a
    /// zero iteration cap, Poisson's ratio outside [0, 0.5) or a non-finite
    /// default temperature.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameters(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.poisson_ratio) {
            return Err(Error::InvalidParameters(format!(
                "Poisson's ratio must be in [0, 0.5), got {}",
                self.poisson_ratio
            )));
        }
        if let Some(t) = self.default_temperature {
            if !t.is_finite() {
                return Err(Error::InvalidParameters(
                    "default temperature must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = CorrectionParameters::default();
        assert_eq!(params.tolerance, 1e-10);
        assert_eq!(params.max_iterations, 60);
        assert_eq!(params.extrapolation, ExtrapolationPolicy::LinearExtrapolate);
        assert_eq!(params.poisson_ratio, 0.30);
        assert!(params.default_temperature.is_none());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let params = CorrectionParameters::default()
            .with_tolerance(1e-8)
            .with_max_iterations(10)
            .with_extrapolation(ExtrapolationPolicy::ClampToPlateau)
            .with_poisson_ratio(0.33)
            .with_default_temperature(22.0)
            .with_threads(2);
        assert_eq!(params.max_iterations, 10);
        assert_eq!(params.default_temperature, Some(22.0));
        assert_eq!(params.n_threads, 2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        let base = CorrectionParameters::default();
        assert!(matches!(
            base.clone().with_tolerance(0.0).validate(),
            Err(Error::InvalidParameters(_))
        ));
        assert!(base.clone().with_tolerance(f64::NAN).validate().is_err());
        assert!(base.clone().with_max_iterations(0).validate().is_err());
        assert!(base.clone().with_poisson_ratio(0.5).validate().is_err());
        assert!(base.clone().with_poisson_ratio(-0.1).validate().is_err());
        assert!(base.with_default_temperature(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_method_history_requirement() {
        assert!(!CorrectionMethod::Neuber.requires_history());
        assert!(!CorrectionMethod::Glinka.requires_history());
        assert!(CorrectionMethod::Ibg.requires_history());
    }
}
