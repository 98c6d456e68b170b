//! Temperature blending of hardening-curve results.
//!
//! Every blended quantity is evaluated on the two tabulated rows bracketing the
//! query temperature and combined linearly. There is no extrapolation across
//! temperature: queries outside the table use the nearest boundary row.

use crate::curve::ExtrapolationPolicy;
use crate::material::MaterialDatabase;

/// Bracketing rows and linear weight for one query temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureBracket {
    /// Lower row index.
    pub lower: usize,
    /// Upper row index (equal to `lower` at the table boundaries).
    pub upper: usize,
    /// Weight of the upper row, in [0, 1].
    pub weight: f64,
}

impl TemperatureBracket {
    /// Whether both rows coincide, so no second evaluation is needed.
    pub fn is_single_row(&self) -> bool {
        self.lower == self.upper
    }

    /// Blend two row results.
    #[inline]
    pub fn mix(&self, lower_value: f64, upper_value: f64) -> f64 {
        (1.0 - self.weight) * lower_value + self.weight * upper_value
    }
}

/// Temperature-blended view of a [`MaterialDatabase`].
///
/// Cheap to construct and `Copy`; correction kernels create one per call.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureBlend<'a> {
    material: &'a MaterialDatabase,
    policy: ExtrapolationPolicy,
}

impl<'a> TemperatureBlend<'a> {
    /// Blend over `material`, extrapolating curve rows according to `policy`.
    pub fn new(material: &'a MaterialDatabase, policy: ExtrapolationPolicy) -> Self {
        Self { material, policy }
    }

    /// Locate the rows bracketing `temperature`.
    ///
    /// Below the first temperature the first row is returned with weight 0;
    /// at or above the last temperature the last row with weight 1.
    pub fn bracket(&self, temperature: f64) -> TemperatureBracket {
        let temps = self.material.temperatures();
        let last = temps.len() - 1;

        // Number of entries strictly below the query.
        let above = temps.partition_point(|&t| t < temperature);
        if above == 0 {
            return TemperatureBracket { lower: 0, upper: 0, weight: 0.0 };
        }
        let lower = above - 1;
        if lower >= last {
            return TemperatureBracket { lower: last, upper: last, weight: 1.0 };
        }
        let upper = lower + 1;
        let weight = (temperature - temps[lower]) / (temps[upper] - temps[lower]);
        TemperatureBracket { lower, upper, weight }
    }

    /// Blend a per-row quantity over the bracket of `temperature`.
    #[inline]
    fn blend_rows<F>(&self, temperature: f64, row_value: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        let bracket = self.bracket(temperature);
        let low = row_value(bracket.lower);
        if bracket.is_single_row() {
            return low;
        }
        bracket.mix(low, row_value(bracket.upper))
    }

    /// Young's modulus E(T).
    pub fn young_modulus(&self, temperature: f64) -> f64 {
        let e = self.material.youngs_modulus();
        self.blend_rows(temperature, |row| e[row])
    }

    /// Yield stress σy(T), the blended first curve point.
    pub fn yield_stress(&self, temperature: f64) -> f64 {
        self.blend_rows(temperature, |row| self.material.curve(row).yield_stress())
    }

    /// Plastic strain εp(T, σ).
    pub fn plastic_strain(&self, temperature: f64, sigma: f64) -> f64 {
        self.blend_rows(temperature, |row| {
            self.material.curve(row).plastic_strain_of_stress(sigma, self.policy)
        })
    }

    /// Flow stress σ(T, εp).
    pub fn stress(&self, temperature: f64, epsp: f64) -> f64 {
        self.blend_rows(temperature, |row| {
            self.material.curve(row).stress_of_plastic_strain(epsp, self.policy)
        })
    }

    /// Plastic work density Up(T, σ).
    pub fn plastic_energy(&self, temperature: f64, sigma: f64) -> f64 {
        self.blend_rows(temperature, |row| {
            self.material.curve(row).plastic_energy_of_stress(sigma, self.policy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn material() -> MaterialDatabase {
        MaterialDatabase::new(
            vec![20.0, 200.0, 400.0],
            vec![200_000.0, 190_000.0, 170_000.0],
            vec![
                vec![300.0, 400.0, 450.0],
                vec![260.0, 350.0, 400.0],
                vec![200.0, 280.0, 320.0],
            ],
            vec![
                vec![0.0, 0.02, 0.08],
                vec![0.0, 0.02, 0.08],
                vec![0.0, 0.02, 0.08],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bracket_interior() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        let b = blend.bracket(110.0);
        assert_eq!((b.lower, b.upper), (0, 1));
        assert_relative_eq!(b.weight, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bracket_boundaries() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());

        assert_eq!(blend.bracket(-50.0), TemperatureBracket { lower: 0, upper: 0, weight: 0.0 });
        assert_eq!(blend.bracket(20.0), TemperatureBracket { lower: 0, upper: 0, weight: 0.0 });
        assert_eq!(blend.bracket(900.0), TemperatureBracket { lower: 2, upper: 2, weight: 1.0 });

        // Exactly on the last temperature: last row with full weight.
        let b = blend.bracket(400.0);
        assert_eq!(b.upper, 2);
        assert_eq!(b.weight, 1.0);

        // Exactly on an interior temperature selects that row unblended.
        let b = blend.bracket(200.0);
        assert_eq!(b.lower, 0);
        assert_eq!(b.weight, 1.0);
    }

    #[test]
    fn test_boundary_rows_unblended() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());

        assert_eq!(blend.young_modulus(20.0), 200_000.0);
        assert_eq!(blend.young_modulus(400.0), 170_000.0);
        assert_eq!(blend.yield_stress(20.0), 300.0);
        assert_eq!(blend.yield_stress(400.0), 200.0);
    }

    #[test]
    fn test_no_extrapolation_across_temperature() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        assert_eq!(blend.young_modulus(-273.0), 200_000.0);
        assert_eq!(blend.yield_stress(1_000.0), 200.0);
        assert_eq!(
            blend.plastic_strain(1_000.0, 300.0),
            blend.plastic_strain(400.0, 300.0)
        );
    }

    #[test]
    fn test_linear_blend() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::default());
        assert_relative_eq!(blend.young_modulus(300.0), 180_000.0, epsilon = 1e-9);
        assert_relative_eq!(blend.yield_stress(110.0), 280.0, epsilon = 1e-9);

        // Blend of the row results, not of the curves.
        let lower = db.curve(0).plastic_strain_of_stress(380.0, ExtrapolationPolicy::default());
        let upper = db.curve(1).plastic_strain_of_stress(380.0, ExtrapolationPolicy::default());
        assert_relative_eq!(
            blend.plastic_strain(110.0, 380.0),
            0.5 * lower + 0.5 * upper,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_flow_stress_and_energy_blend() {
        let db = material();
        let blend = TemperatureBlend::new(&db, ExtrapolationPolicy::ClampToPlateau);
        assert_relative_eq!(blend.stress(300.0, 0.0), 230.0, epsilon = 1e-9);
        assert_relative_eq!(blend.stress(300.0, 1.0), 360.0, epsilon = 1e-9);
        assert_eq!(blend.plastic_energy(300.0, 100.0), 0.0);
        assert!(blend.plastic_energy(300.0, 300.0) > 0.0);
    }
}
