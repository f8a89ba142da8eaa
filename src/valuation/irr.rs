//! Internal Rate of Return (IRR) calculation
//!
//! Used to report the investor's yield on a buyout: pay the offer today,
//! collect the lease rent for the remaining term.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lease::LeaseParams;

/// Lower clamp on the working rate (-99%)
pub const MIN_RATE: f64 = -0.99;

/// Upper clamp on the working rate (1000%)
pub const MAX_RATE: f64 = 10.0;

/// Newton-Raphson settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrOptions {
    pub initial_guess: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrOptions {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

/// Solver output. `rate` is always populated; when `converged` is false it is
/// the last estimate reached before the solver gave up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    pub rate: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Solve for the rate that zeroes NPV, where index 0 is at time 0 (undiscounted).
///
/// Never fails: a vanishing derivative or an exhausted iteration budget
/// returns the best estimate with `converged = false`.
pub fn solve_irr(cash_flows: &[f64], options: &IrrOptions) -> IrrSolution {
    let tolerance = options.tolerance;
    let mut rate = options.initial_guess.clamp(MIN_RATE, MAX_RATE);

    for iteration in 1..=options.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cash_flows, rate);

        if npv.abs() < tolerance {
            return IrrSolution { rate, iterations: iteration, converged: true };
        }

        if dnpv.abs() < tolerance {
            log::warn!("IRR derivative vanished at rate {:.6} (NPV {:.6}); returning estimate", rate, npv);
            return IrrSolution { rate, iterations: iteration, converged: false };
        }

        let new_rate = rate - npv / dnpv;

        if (new_rate - rate).abs() < tolerance {
            return IrrSolution { rate: new_rate, iterations: iteration, converged: true };
        }

        // Bound the rate to reasonable values; a rate pinned at a bound keeps
        // taking full-size steps and never counts as converged
        rate = new_rate.clamp(MIN_RATE, MAX_RATE);
    }

    log::warn!(
        "IRR did not converge after {} iterations; last estimate {:.6}",
        options.max_iterations,
        rate
    );
    IrrSolution {
        rate,
        iterations: options.max_iterations,
        converged: false,
    }
}

/// IRR with default options, rate only
pub fn irr(cash_flows: &[f64]) -> f64 {
    solve_irr(cash_flows, &IrrOptions::default()).rate
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cash_flows.iter().enumerate() {
        let growth = (1.0 + rate).powi(t as i32);
        npv += cf / growth;
        dnpv -= (t as f64) * cf / (growth * (1.0 + rate));
    }

    (npv, dnpv)
}

/// Investor view of a buyout: the offer paid at time 0, rent received from year 1
pub fn investor_cash_flows(offer: f64, cash_flows: &[f64]) -> Vec<f64> {
    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-offer);
    flows.extend_from_slice(cash_flows);
    flows
}

/// Investor IRR of buying `params` for `offer`
pub fn buyout_irr(params: &LeaseParams, offer: f64, options: &IrrOptions) -> Result<IrrSolution> {
    let cash_flows = params.cash_flows()?;
    Ok(solve_irr(&investor_cash_flows(offer, &cash_flows), options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::present_value;

    #[test]
    fn test_simple_irr() {
        // Invest 1000, receive 1100 after one year
        let solution = solve_irr(&[-1000.0, 1100.0], &IrrOptions::default());
        assert!(solution.converged);
        assert!((solution.rate - 0.10).abs() < 1e-6, "got {}", solution.rate);
    }

    #[test]
    fn test_newton_steps_from_guess() {
        // Invest 1000, receive 1200 after one year: root is 20%, guess is 10%
        let solution = solve_irr(&[-1000.0, 1200.0], &IrrOptions::default());
        assert!(solution.converged);
        assert!(solution.iterations > 1);
        assert!((solution.rate - 0.20).abs() < 1e-6, "got {}", solution.rate);
    }

    #[test]
    fn test_irr_recovers_discount_rate() {
        // Paying full PV at r for rent in arrears yields exactly r
        let rent = LeaseParams::new(100_000.0, 20).with_escalator(0.02);
        let flows = rent.cash_flows().unwrap();
        let pv = present_value(&flows, 0.07);

        let solution = buyout_irr(&rent, pv, &IrrOptions::default()).unwrap();
        assert!(solution.converged);
        assert!((solution.rate - 0.07).abs() < 1e-6, "got {}", solution.rate);
    }

    #[test]
    fn test_discounted_offer_yields_more() {
        let rent = LeaseParams::new(95_680.0, 23).with_escalator(0.025);
        let flows = rent.cash_flows().unwrap();
        let offer = present_value(&flows, 0.10) * 0.85;

        let rate = irr(&investor_cash_flows(offer, &flows));
        assert!(rate > 0.10);
    }

    #[test]
    fn test_flat_derivative_returns_estimate() {
        // Lone outlay: NPV is constant, derivative is zero
        let solution = solve_irr(&[-100.0], &IrrOptions::default());
        assert!(!solution.converged);
        assert_eq!(solution.rate, 0.10);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let options = IrrOptions { max_iterations: 1, ..IrrOptions::default() };
        let solution = solve_irr(&[-1000.0, 1200.0], &options);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
        assert!(solution.rate.is_finite());
    }

    #[test]
    fn test_rate_is_clamped() {
        // No sign change: every inflow pushes the rate upward until it hits the cap
        let options = IrrOptions::default();
        let solution = solve_irr(&[1000.0, 1000.0, 1000.0], &options);
        assert_eq!(solution.rate, MAX_RATE);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, options.max_iterations);
    }

    #[test]
    fn test_free_buyout_is_not_converged() {
        // Paying nothing for the rent has no finite yield
        let flows = investor_cash_flows(0.0, &[100_000.0, 100_000.0, 100_000.0]);
        let solution = solve_irr(&flows, &IrrOptions::default());
        assert_eq!(solution.rate, MAX_RATE);
        assert!(!solution.converged);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let flows = [-1000.0, 300.0, 400.0, 500.0];
        let (_, dnpv) = npv_and_derivative(&flows, 0.08);
        let h = 1e-6;
        let (up, _) = npv_and_derivative(&flows, 0.08 + h);
        let (down, _) = npv_and_derivative(&flows, 0.08 - h);
        assert!((dnpv - (up - down) / (2.0 * h)).abs() < 1e-3);
    }

    #[test]
    fn test_investor_cash_flows() {
        assert_eq!(investor_cash_flows(250.0, &[100.0, 200.0]), vec![-250.0, 100.0, 200.0]);
        assert_eq!(investor_cash_flows(0.0, &[]), vec![-0.0]);
    }
}
