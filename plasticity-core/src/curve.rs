//! Single-temperature hardening curve operations.
//!
//! A [`CurveRow`] borrows one row of the hardening database: a strictly
//! increasing stress axis and the plastic strain reached at each stress point.
//! All three primitives are piecewise-linear and share the same bracketing and
//! extrapolation rules past the last tabulated point.

use crate::types::EPS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behaviour beyond the last tabulated point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ExtrapolationPolicy {
    /// Continue with the slope of the final segment.
    #[default]
    LinearExtrapolate,
    /// Hold the last tabulated value.
    ClampToPlateau,
}

/// One hardening curve: `(stress[k], plastic_strain[k])` pairs.
#[derive(Debug, Clone, Copy)]
pub struct CurveRow<'a> {
    stress: &'a [f64],
    plastic_strain: &'a [f64],
}

impl<'a> CurveRow<'a> {
    /// Wrap an already validated row (equal lengths, at least two points).
    pub(crate) fn new(stress: &'a [f64], plastic_strain: &'a [f64]) -> Self {
        debug_assert_eq!(stress.len(), plastic_strain.len());
        debug_assert!(stress.len() >= 2);
        Self { stress, plastic_strain }
    }

    /// Stress axis.
    pub fn stress(&self) -> &'a [f64] {
        self.stress
    }

    /// Plastic strain axis.
    pub fn plastic_strain(&self) -> &'a [f64] {
        self.plastic_strain
    }

    /// First tabulated stress (onset of yield).
    pub fn yield_stress(&self) -> f64 {
        self.stress[0]
    }

    /// Last segment as `(s0, s1, e0, e1)`.
    fn last_segment(&self) -> (f64, f64, f64, f64) {
        let n = self.stress.len();
        (
            self.stress[n - 2],
            self.stress[n - 1],
            self.plastic_strain[n - 2],
            self.plastic_strain[n - 1],
        )
    }

    /// Plastic strain reached at stress `sigma`.
    ///
    /// Zero at or below the first point.
    pub fn plastic_strain_of_stress(&self, sigma: f64, policy: ExtrapolationPolicy) -> f64 {
        if sigma <= self.stress[0] {
            return 0.0;
        }
        for k in 0..self.stress.len() - 1 {
            let (s0, s1) = (self.stress[k], self.stress[k + 1]);
            if s0 <= sigma && sigma <= s1 {
                let (e0, e1) = (self.plastic_strain[k], self.plastic_strain[k + 1]);
                return e0 + (sigma - s0) * (e1 - e0) / (s1 - s0 + EPS);
            }
        }
        let (s0, s1, e0, e1) = self.last_segment();
        match policy {
            ExtrapolationPolicy::ClampToPlateau => e1,
            ExtrapolationPolicy::LinearExtrapolate => {
                let slope = (e1 - e0) / (s1 - s0 + EPS);
                e1 + (sigma - s1) * slope
            }
        }
    }

    /// Flow stress at plastic strain `epsp` (inverse of
    /// [`plastic_strain_of_stress`](Self::plastic_strain_of_stress)).
    ///
    /// Returns the first stress at or below the first strain point.
    pub fn stress_of_plastic_strain(&self, epsp: f64, policy: ExtrapolationPolicy) -> f64 {
        if epsp <= self.plastic_strain[0] {
            return self.stress[0];
        }
        for k in 0..self.plastic_strain.len() - 1 {
            let (e0, e1) = (self.plastic_strain[k], self.plastic_strain[k + 1]);
            if e0 <= epsp && epsp <= e1 {
                let (s0, s1) = (self.stress[k], self.stress[k + 1]);
                let t = (epsp - e0) / (e1 - e0 + EPS);
                return s0 + t * (s1 - s0);
            }
        }
        let (s0, s1, e0, e1) = self.last_segment();
        match policy {
            ExtrapolationPolicy::ClampToPlateau => s1,
            ExtrapolationPolicy::LinearExtrapolate => {
                let slope = (s1 - s0) / (e1 - e0 + EPS);
                s1 + slope * (epsp - e1)
            }
        }
    }

    /// Plastic work density `Up(σ) = ∫ σ_flow dεp` from zero to `εp(σ)`.
    ///
    /// Full-segment trapezoids are summed up to the bracketing segment, then
    /// a partial trapezoid covers the remainder. Under the plateau policy the
    /// area stops at the last tabulated point.
    pub fn plastic_energy_of_stress(&self, sigma: f64, policy: ExtrapolationPolicy) -> f64 {
        if sigma <= self.stress[0] {
            return 0.0;
        }
        let mut area = 0.0;
        for k in 0..self.stress.len() - 1 {
            let (s0, s1) = (self.stress[k], self.stress[k + 1]);
            let (e0, e1) = (self.plastic_strain[k], self.plastic_strain[k + 1]);
            if sigma <= s1 {
                let et = e0 + (sigma - s0) * (e1 - e0) / (s1 - s0 + EPS);
                return area + 0.5 * (s0 + sigma) * (et - e0);
            }
            area += 0.5 * (s0 + s1) * (e1 - e0);
        }
        match policy {
            ExtrapolationPolicy::ClampToPlateau => area,
            ExtrapolationPolicy::LinearExtrapolate => {
                let (s0, s1, e0, e1) = self.last_segment();
                let slope = (e1 - e0) / (s1 - s0 + EPS);
                let et = e1 + slope * (sigma - s1);
                area + 0.5 * (s1 + sigma) * (et - e1)
            }
        }
    }
}
