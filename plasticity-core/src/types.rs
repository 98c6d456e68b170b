//! Stress tensor primitives in Voigt notation.
//!
//! This module defines the tensor operations the IBG corrector relies on:
//! - Von Mises equivalent stress
//! - Hydrostatic / deviatoric split
//! - Energy-weighted inner products (shear counted twice)
//! - Elastic strain energy increments

use nalgebra::Vector6;

/// Additive guard for denominators that may vanish on degenerate input.
pub const EPS: f64 = 1e-12;

/// Inner-product weights converting engineering Voigt products to tensor
/// contractions: shear terms appear twice in `s:s`.
pub const VOIGT_WEIGHTS: [f64; 6] = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

/// Symmetric stress tensor in Voigt notation.
///
/// Components are ordered as: [σ_xx, σ_yy, σ_zz, τ_xy, τ_yz, τ_zx]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTensor(pub Vector6<f64>);

impl StressTensor {
    /// Create a new stress tensor from Voigt components.
    pub fn new(components: [f64; 6]) -> Self {
        Self(Vector6::from_row_slice(&components))
    }

    /// Zero stress state.
    pub fn zero() -> Self {
        Self(Vector6::zeros())
    }

    /// Uniaxial stress along x.
    pub fn uniaxial(sigma_xx: f64) -> Self {
        Self::new([sigma_xx, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    /// Compute von Mises equivalent stress.
    pub fn von_mises(&self) -> f64 {
        let s = &self.0;
        let (s_xx, s_yy, s_zz) = (s[0], s[1], s[2]);
        let (t_xy, t_yz, t_zx) = (s[3], s[4], s[5]);

        let normal = (s_xx - s_yy).powi(2) + (s_yy - s_zz).powi(2) + (s_zz - s_xx).powi(2);
        let shear = t_xy * t_xy + t_yz * t_yz + t_zx * t_zx;

        (0.5 * normal + 3.0 * shear).sqrt()
    }

    /// Compute hydrostatic (mean) stress.
    pub fn hydrostatic(&self) -> f64 {
        (self.0[0] + self.0[1] + self.0[2]) / 3.0
    }

    /// Hydrostatic part `[m, m, m, 0, 0, 0]`.
    pub fn hydrostatic_part(&self) -> Self {
        let m = self.hydrostatic();
        Self::new([m, m, m, 0.0, 0.0, 0.0])
    }

    /// Deviatoric part (stress minus its hydrostatic part).
    pub fn deviator(&self) -> Self {
        Self(self.0 - self.hydrostatic_part().0)
    }

    /// Tensor contraction `a:b` in Voigt form, shear terms weighted by 2.
    pub fn weighted_dot(&self, other: &StressTensor) -> f64 {
        VOIGT_WEIGHTS
            .iter()
            .enumerate()
            .map(|(i, w)| w * self.0[i] * other.0[i])
            .sum()
    }

    /// Radially scale the deviatoric part while keeping the mean stress.
    pub fn scale_deviatoric(&self, scale: f64) -> Self {
        let hyd = self.hydrostatic_part();
        Self(hyd.0 + (self.0 - hyd.0) * scale)
    }
}

/// Shear modulus G = E / (2(1 + ν)).
pub fn shear_modulus(youngs_modulus: f64, poissons_ratio: f64) -> f64 {
    youngs_modulus / (2.0 * (1.0 + poissons_ratio))
}

/// Uniaxial elastic energy increment ½(σ₀+σ₁)(σ₁−σ₀)/E.
pub fn delta_elastic_energy_uniaxial(sigma_prev: f64, sigma_now: f64, youngs_modulus: f64) -> f64 {
    0.5 * (sigma_prev + sigma_now) * (sigma_now - sigma_prev) / (youngs_modulus + EPS)
}

/// Deviatoric elastic energy increment between two stress states.
///
/// ΔUe = ½(s₀+s₁):(e₁−e₀) with e = s/(2G), i.e.
/// `(s₀+s₁):(s₁−s₀) / 4G`.
pub fn delta_elastic_energy_deviatoric(
    sigma_prev: &StressTensor,
    sigma_now: &StressTensor,
    youngs_modulus: f64,
    poissons_ratio: f64,
) -> f64 {
    let dp = sigma_prev.deviator();
    let dn = sigma_now.deviator();
    let g = shear_modulus(youngs_modulus, poissons_ratio);
    let sum = StressTensor(dp.0 + dn.0);
    let diff = StressTensor(dn.0 - dp.0);
    sum.weighted_dot(&diff) / (4.0 * g + EPS)
}
