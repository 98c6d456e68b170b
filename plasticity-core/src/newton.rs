//! Damped scalar Newton-Raphson for positive roots.
//!
//! Shared by the Neuber and Glinka correctors, which differ in their residual
//! and [`StopRule`]. The derivative is a forward finite difference, and any
//! step that would leave the positive half-line halves the current iterate
//! instead.
//!
//! ```text
//! Loop k = 1 .. max_iterations
//!   1. r = R(σ);           |r| < tol           → converged (StepOrResidual)
//!   2. r' = (R(σ+h) − r)/h, h = 1e-6·max(|σ|, 1)
//!   3. σ⁺ = σ − r/r';      σ⁺ ≤ 0 → σ⁺ = σ/2
//!   4. |r/r'| / |σ| < tol                      → converged
//! ```

use crate::types::EPS;

/// Relative finite-difference step.
const FD_STEP: f64 = 1e-6;

/// Smallest admissible starting point.
const MIN_SEED: f64 = 1e-6;

/// Convergence tests applied each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Stop only when the relative Newton step falls below tolerance.
    StepOnly,
    /// Also stop as soon as the residual itself falls below tolerance.
    StepOrResidual,
}

/// Result of a Newton solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOutcome {
    /// Last iterate (the root when `converged`).
    pub root: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a convergence test passed before the iteration cap.
    pub converged: bool,
}

/// Solve `residual(σ) = 0` for σ > 0 starting from `seed`.
///
/// Under [`StopRule::StepOrResidual`], `residual` should be scaled so that
/// `tolerance` is meaningful as an absolute bound on it; scaling by a positive constant leaves the Newton
/// steps unchanged. Non-convergence is not an error: the last iterate is
/// returned with `converged = false`.
pub fn solve_positive<F>(
    seed: f64,
    tolerance: f64,
    max_iterations: usize,
    stop: StopRule,
    residual: F,
) -> NewtonOutcome
where
    F: Fn(f64) -> f64,
{
    let mut sigma = if seed > 0.0 { seed } else { MIN_SEED };

    for iteration in 1..=max_iterations {
        let r = residual(sigma);
        if stop == StopRule::StepOrResidual && r.abs() < tolerance {
            return NewtonOutcome { root: sigma, iterations: iteration, converged: true };
        }

        let h = FD_STEP * sigma.abs().max(1.0);
        let derivative = (residual(sigma + h) - r) / h;
        let step = r / (derivative + EPS);

        let mut next = sigma - step;
        if next <= 0.0 {
            next = 0.5 * sigma;
        }
        if step.abs() / (sigma.abs() + EPS) < tolerance {
            return NewtonOutcome { root: next, iterations: iteration, converged: true };
        }
        sigma = next;
    }

    NewtonOutcome { root: sigma, iterations: max_iterations, converged: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_root() {
        let outcome = solve_positive(1.0, 1e-12, 60, StopRule::StepOnly, |x| x * x - 2.0);
        assert!(outcome.converged);
        assert_relative_eq!(outcome.root, 2.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_seed_at_root_returns_immediately() {
        let outcome = solve_positive(3.0, 1e-10, 60, StopRule::StepOrResidual, |x| x - 3.0);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.root, 3.0);
    }

    #[test]
    fn test_step_only_moves_off_near_root() {
        // Residual below tolerance at the seed still takes one Newton step.
        let outcome = solve_positive(3.0, 1e-10, 60, StopRule::StepOnly, |x| x - 3.0 - 1e-12);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.root > 3.0);
        assert_relative_eq!(outcome.root, 3.0 + 1e-12, epsilon = 1e-14);
    }

    #[test]
    fn test_non_positive_seed_floored() {
        let outcome = solve_positive(-5.0, 1e-12, 100, StopRule::StepOrResidual, |x| x - 0.5);
        assert!(outcome.converged);
        assert_relative_eq!(outcome.root, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_damping_keeps_iterate_positive() {
        // First Newton step from 10 overshoots far below zero.
        let outcome = solve_positive(10.0, 1e-12, 200, StopRule::StepOrResidual, |x| x.ln());
        assert!(outcome.converged);
        assert_relative_eq!(outcome.root, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_iteration_cap_returns_last_iterate() {
        // No positive root: iterates are halved until the cap.
        let outcome = solve_positive(1.0, 1e-12, 5, StopRule::StepOnly, |x| x + 1.0);
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 5);
        assert!(outcome.root > 0.0);
    }
}
