//! Temperature-indexed hardening database.
//!
//! The database is an immutable table of multilinear hardening curves, one per
//! tabulated temperature. All invariants are checked once in
//! [`MaterialDatabase::new`]; the correction kernels rely on them without
//! re-checking and share the database read-only across worker threads.

use crate::curve::CurveRow;
use crate::error::{Error, Result};

/// Temperature-blended multilinear hardening database.
///
/// Shapes:
/// - `temperatures`: (N_T,) strictly increasing
/// - `youngs_modulus`: (N_T,)
/// - stress / plastic-strain curves: (N_T, N_P), stored row-major
///
/// The first point of each stress row is the yield stress at that
/// temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDatabase {
    temperatures: Vec<f64>,
    youngs_modulus: Vec<f64>,
    stress: Vec<f64>,
    plastic_strain: Vec<f64>,
    n_points: usize,
}

impl MaterialDatabase {
    /// Build and validate a database from raw tables.
    ///
    /// # Arguments
    ///
    /// * `temperatures` - Tabulated temperatures, strictly increasing
    /// * `youngs_modulus` - Young's modulus at each temperature
    /// * `stress_curve` - One strictly increasing stress row per temperature
    /// * `plastic_strain_curve` - Plastic strain at each stress point
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] if shapes disagree, a curve has fewer
    /// than two points, or an axis is not monotonic.
    pub fn new(
        temperatures: Vec<f64>,
        youngs_modulus: Vec<f64>,
        stress_curve: Vec<Vec<f64>>,
        plastic_strain_curve: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n_temps = temperatures.len();
        if n_temps == 0 {
            return Err(Error::InvalidMaterial(
                "at least one temperature is required".into(),
            ));
        }
        if youngs_modulus.len() != n_temps {
            return Err(Error::InvalidMaterial(format!(
                "temperature and Young's modulus length mismatch ({} vs {})",
                n_temps,
                youngs_modulus.len()
            )));
        }
        if stress_curve.len() != n_temps || plastic_strain_curve.len() != n_temps {
            return Err(Error::InvalidMaterial(format!(
                "curve tables must have one row per temperature ({} temperatures, {} stress rows, {} strain rows)",
                n_temps,
                stress_curve.len(),
                plastic_strain_curve.len()
            )));
        }

        let n_points = stress_curve[0].len();
        for (row, (sig, epsp)) in stress_curve.iter().zip(&plastic_strain_curve).enumerate() {
            if sig.len() != n_points || epsp.len() != n_points {
                return Err(Error::InvalidMaterial(format!(
                    "stress and plastic strain curves must share one shape (row {row})"
                )));
            }
        }
        if n_points < 2 {
            return Err(Error::InvalidMaterial(
                "need at least two points per hardening curve".into(),
            ));
        }

        if temperatures.iter().any(|t| !t.is_finite()) {
            return Err(Error::InvalidMaterial("temperatures must be finite".into()));
        }
        if temperatures.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidMaterial(
                "temperatures must be strictly increasing".into(),
            ));
        }
        if youngs_modulus.iter().any(|&e| !e.is_finite() || e <= 0.0) {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        for (row, sig) in stress_curve.iter().enumerate() {
            if sig.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(Error::InvalidMaterial(format!(
                    "stress curve at {} must be strictly increasing",
                    temperatures[row]
                )));
            }
        }
        for (row, epsp) in plastic_strain_curve.iter().enumerate() {
            if epsp.windows(2).any(|w| !(w[1] >= w[0])) {
                return Err(Error::InvalidMaterial(format!(
                    "plastic strain curve at {} must not decrease",
                    temperatures[row]
                )));
            }
        }

        Ok(Self {
            temperatures,
            youngs_modulus,
            stress: stress_curve.into_iter().flatten().collect(),
            plastic_strain: plastic_strain_curve.into_iter().flatten().collect(),
            n_points,
        })
    }

    /// Tabulated temperatures.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Young's modulus per tabulated temperature.
    pub fn youngs_modulus(&self) -> &[f64] {
        &self.youngs_modulus
    }

    /// Number of tabulated temperatures.
    pub fn n_temperatures(&self) -> usize {
        self.temperatures.len()
    }

    /// Number of points per hardening curve.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Hardening curve at tabulated temperature index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_temperatures()`.
    pub fn curve(&self, index: usize) -> CurveRow<'_> {
        let start = index * self.n_points;
        let end = start + self.n_points;
        CurveRow::new(&self.stress[start..end], &self.plastic_strain[start..end])
    }
}

/// Build a validated database from raw tables.
///
/// Convenience wrapper around [`MaterialDatabase::new`].
pub fn build_material_database(
    temperatures: Vec<f64>,
    youngs_modulus: Vec<f64>,
    stress_curve: Vec<Vec<f64>>,
    plastic_strain_curve: Vec<Vec<f64>>,
) -> Result<MaterialDatabase> {
    MaterialDatabase::new(temperatures, youngs_modulus, stress_curve, plastic_strain_curve)
}

/// Trivial single-temperature database for smoke testing.
///
/// One temperature (22), E = 70000, two-point curve from yield at 400 to
/// 1004.3 at plastic strain 0.3007.
pub fn default_material_database() -> MaterialDatabase {
    MaterialDatabase {
        temperatures: vec![22.0],
        youngs_modulus: vec![70_000.0],
        stress: vec![400.0, 1_004.3],
        plastic_strain: vec![0.0, 0.3007],
        n_points: 2,
    }
}
