//! Lease economics and yearly cash-flow generation

use serde::{Deserialize, Serialize};

use crate::error::{LeaseError, Result};

/// How rent grows from one lease year to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Escalation {
    /// Same fractional growth every year, compounding from the first payment
    Uniform(f64),
    /// Explicit per-year growth rates, one per lease year.
    /// Year i's rent is the base rent times the product of all rates up to and including i.
    Schedule(Vec<f64>),
}

impl Default for Escalation {
    fn default() -> Self {
        Escalation::Uniform(0.0)
    }
}

impl Escalation {
    /// Uniform rate, or the first scheduled rate (0 for an empty schedule)
    pub fn headline_rate(&self) -> f64 {
        match self {
            Escalation::Uniform(rate) => *rate,
            Escalation::Schedule(rates) => rates.first().copied().unwrap_or(0.0),
        }
    }
}

/// Parameters that define a ground-lease cash-flow stream
///
/// Immutable once built; cash flows are recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseParams {
    /// Base-year rent in dollars
    annual_rent: f64,

    /// Whole years of payments remaining
    term_years: u32,

    /// Rent growth
    #[serde(default)]
    escalation: Escalation,

    /// One-off cost netted against the final year (e.g. decommissioning).
    /// Negative values are a terminal bonus.
    #[serde(default)]
    balloon_cost: f64,
}

impl LeaseParams {
    /// Flat rent, no escalation, no balloon
    pub fn new(annual_rent: f64, term_years: u32) -> Self {
        Self {
            annual_rent,
            term_years,
            escalation: Escalation::default(),
            balloon_cost: 0.0,
        }
    }

    /// Apply a uniform annual escalator (e.g. 0.025 for 2.5% p.a.)
    pub fn with_escalator(mut self, escalator: f64) -> Self {
        self.escalation = Escalation::Uniform(escalator);
        self
    }

    /// Apply a per-year escalator schedule, overriding any uniform escalator.
    /// Length is checked when cash flows are generated.
    pub fn with_schedule(mut self, escalators: Vec<f64>) -> Self {
        self.escalation = Escalation::Schedule(escalators);
        self
    }

    pub fn with_escalation(mut self, escalation: Escalation) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn with_balloon_cost(mut self, balloon_cost: f64) -> Self {
        self.balloon_cost = balloon_cost;
        self
    }

    pub fn annual_rent(&self) -> f64 {
        self.annual_rent
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn escalation(&self) -> &Escalation {
        &self.escalation
    }

    pub fn balloon_cost(&self) -> f64 {
        self.balloon_cost
    }

    /// Check the escalator schedule against the term without generating cash flows
    pub fn validate(&self) -> Result<()> {
        if let Escalation::Schedule(rates) = &self.escalation {
            if rates.len() != self.term_years as usize {
                return Err(LeaseError::EscalatorLengthMismatch {
                    term_years: self.term_years,
                    schedule_len: rates.len(),
                });
            }
        }
        Ok(())
    }

    /// Yearly cash flows (positive = inflow), index 0 is year 1's payment
    pub fn cash_flows(&self) -> Result<Vec<f64>> {
        self.validate()?;

        let mut rents: Vec<f64> = match &self.escalation {
            Escalation::Schedule(rates) => rates
                .iter()
                .scan(1.0, |growth, rate| {
                    *growth *= 1.0 + rate;
                    Some(self.annual_rent * *growth)
                })
                .collect(),
            Escalation::Uniform(rate) => (0..self.term_years)
                .map(|year| self.annual_rent * (1.0 + rate).powi(year as i32))
                .collect(),
        };

        // Balloon lands on the final year only; an empty term has nowhere to put it
        if let Some(last) = rents.last_mut() {
            *last -= self.balloon_cost;
        }

        Ok(rents)
    }
}

/// Produce cash flows for a lease
pub fn generate_cash_flows(params: &LeaseParams) -> Result<Vec<f64>> {
    params.cash_flows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_flows(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_flat_rent() {
        let flows = LeaseParams::new(100_000.0, 3).cash_flows().unwrap();
        assert_eq!(flows, vec![100_000.0, 100_000.0, 100_000.0]);
    }

    #[test]
    fn test_uniform_escalator() {
        let flows = LeaseParams::new(100_000.0, 3)
            .with_escalator(0.05)
            .cash_flows()
            .unwrap();
        assert_flows(&flows, &[100_000.0, 105_000.0, 110_250.0]);
    }

    #[test]
    fn test_schedule_compounds() {
        // 100k * 1.05 = 105k, * 1.10 = 115.5k, * 1.15 = 132.825k
        let flows = LeaseParams::new(100_000.0, 3)
            .with_schedule(vec![0.05, 0.10, 0.15])
            .cash_flows()
            .unwrap();
        assert_flows(&flows, &[105_000.0, 115_500.0, 132_825.0]);
    }

    #[test]
    fn test_schedule_overrides_uniform() {
        let params = LeaseParams::new(100_000.0, 2)
            .with_escalator(0.50)
            .with_schedule(vec![0.0, 0.0]);
        assert_eq!(params.cash_flows().unwrap(), vec![100_000.0, 100_000.0]);
    }

    #[test]
    fn test_schedule_length_mismatch() {
        let params = LeaseParams::new(100_000.0, 3).with_schedule(vec![0.05, 0.10]);
        let err = params.cash_flows().unwrap_err();
        assert!(matches!(
            err,
            LeaseError::EscalatorLengthMismatch { term_years: 3, schedule_len: 2 }
        ));
        assert!(err.to_string().contains("must equal term_years"));
    }

    #[test]
    fn test_balloon_hits_final_year_only() {
        let flows = LeaseParams::new(100_000.0, 2)
            .with_balloon_cost(50_000.0)
            .cash_flows()
            .unwrap();
        assert_eq!(flows, vec![100_000.0, 50_000.0]);

        let flows = LeaseParams::new(100_000.0, 2)
            .with_schedule(vec![0.10, 0.0])
            .with_balloon_cost(10_000.0)
            .cash_flows()
            .unwrap();
        assert_flows(&flows, &[110_000.0, 100_000.0]);
    }

    #[test]
    fn test_negative_balloon_is_bonus() {
        let flows = LeaseParams::new(1_000.0, 3)
            .with_balloon_cost(-500.0)
            .cash_flows()
            .unwrap();
        assert_eq!(flows, vec![1_000.0, 1_000.0, 1_500.0]);
    }

    #[test]
    fn test_zero_term_is_empty() {
        let flows = LeaseParams::new(100_000.0, 0)
            .with_balloon_cost(50_000.0)
            .cash_flows()
            .unwrap();
        assert!(flows.is_empty());

        // An empty schedule matches an empty term
        let flows = LeaseParams::new(100_000.0, 0)
            .with_schedule(Vec::new())
            .cash_flows()
            .unwrap();
        assert!(flows.is_empty());
    }

    #[test]
    fn test_zero_rent() {
        let flows = LeaseParams::new(0.0, 10).with_escalator(0.03).cash_flows().unwrap();
        assert!(flows.iter().all(|&cf| cf == 0.0));
    }

    #[test]
    fn test_negative_escalator_decays() {
        let flows = LeaseParams::new(100_000.0, 10)
            .with_escalator(-0.02)
            .cash_flows()
            .unwrap();
        assert!(flows.windows(2).all(|w| w[1] < w[0]));
        assert!(flows.iter().all(|&cf| cf > 0.0));
    }

    #[test]
    fn test_generation_is_repeatable() {
        let params = LeaseParams::new(95_680.0, 23)
            .with_escalator(0.025)
            .with_balloon_cost(12_000.0);
        assert_eq!(params.cash_flows().unwrap(), generate_cash_flows(&params).unwrap());
    }

    #[test]
    fn test_headline_rate() {
        assert_eq!(Escalation::Uniform(0.02).headline_rate(), 0.02);
        assert_eq!(Escalation::Schedule(vec![0.03, 0.01]).headline_rate(), 0.03);
        assert_eq!(Escalation::Schedule(Vec::new()).headline_rate(), 0.0);
    }
}
