//! Portfolio runner for batch lease valuation
//!
//! Holds the pricing rules once, then values any number of lease records in
//! parallel and rolls the offers up into portfolio totals.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::lease::LeaseRecord;
use crate::pricing::{multiple, PricingPolicy, RiskTier, ValuationConfig};
use crate::valuation::{investor_cash_flows, solve_irr, BuyoutValuation, IrrOptions, IrrSolution};

/// How discount rate and buyout percentage are chosen for each lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pricing {
    /// Risk tier picks the rate, deal size picks the percentage, offers are floored
    Policy,
    /// One rate and percentage for every lease, no floor
    Fixed(ValuationConfig),
}

/// Valuation of a single lease, ready for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseValuation {
    pub name: String,
    pub annual_rent: f64,
    pub term_years: u32,
    pub escalator: f64,
    pub risk_tier: RiskTier,
    pub discount_rate: f64,
    pub buyout_pct: f64,
    pub undiscounted_value: f64,
    pub present_value: f64,
    /// PV times buyout percentage, before any floor
    pub base_offer: f64,
    pub final_offer: f64,
    pub multiple: f64,
    pub benchmark: f64,
    pub competitiveness_pct: f64,
    pub competitive: bool,
    /// Investor yield from paying `final_offer` for the rent stream
    pub irr: IrrSolution,
}

/// Pre-configured runner for valuing many leases
#[derive(Debug, Clone)]
pub struct PortfolioRunner {
    policy: PricingPolicy,
    pricing: Pricing,
    irr_options: IrrOptions,
}

impl PortfolioRunner {
    /// Runner applying the default competitive pricing policy
    pub fn new() -> Self {
        Self::with_policy(PricingPolicy::default())
    }

    pub fn with_policy(policy: PricingPolicy) -> Self {
        Self {
            policy,
            pricing: Pricing::Policy,
            irr_options: IrrOptions::default(),
        }
    }

    /// Runner using one rate and percentage for every lease
    pub fn fixed(config: ValuationConfig) -> Self {
        Self {
            policy: PricingPolicy::default(),
            pricing: Pricing::Fixed(config),
            irr_options: IrrOptions::default(),
        }
    }

    pub fn with_irr_options(mut self, options: IrrOptions) -> Self {
        self.irr_options = options;
        self
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Value a single lease
    pub fn value(&self, record: &LeaseRecord) -> Result<LeaseValuation> {
        let params = record.to_params()?;

        let (config, floored) = match &self.pricing {
            Pricing::Policy => (self.policy.config_for(record.risk_tier, record.annual_rent), true),
            Pricing::Fixed(config) => (*config, false),
        };

        let buyout = BuyoutValuation::compute(&params, &config)?;
        let final_offer = if floored {
            self.policy.apply_floor(buyout.offer, record.annual_rent)
        } else {
            buyout.offer
        };
        let competitiveness_pct = self.policy.competitiveness_pct(final_offer, record.annual_rent);
        let irr = solve_irr(&investor_cash_flows(final_offer, &buyout.cash_flows), &self.irr_options);

        log::debug!(
            "{}: PV ${:.2} at {:.1}%, offer ${:.2} ({:.1}x), IRR {:.4}",
            record.name,
            buyout.present_value,
            config.discount_rate * 100.0,
            final_offer,
            multiple(final_offer, record.annual_rent),
            irr.rate,
        );

        Ok(LeaseValuation {
            name: record.name.clone(),
            annual_rent: record.annual_rent,
            term_years: record.term_years,
            escalator: params.escalation().headline_rate(),
            risk_tier: record.risk_tier,
            discount_rate: config.discount_rate,
            buyout_pct: config.buyout_pct,
            undiscounted_value: buyout.undiscounted_value,
            present_value: buyout.present_value,
            base_offer: buyout.offer,
            final_offer,
            multiple: multiple(final_offer, record.annual_rent),
            benchmark: self.policy.benchmark(record.annual_rent),
            competitiveness_pct,
            competitive: self.policy.is_competitive(competitiveness_pct),
            irr,
        })
    }

    /// Value leases in parallel, keeping input order. Leases that fail
    /// validation are logged and left out.
    pub fn value_batch(&self, records: &[LeaseRecord]) -> Vec<LeaseValuation> {
        records
            .par_iter()
            .filter_map(|record| match self.value(record) {
                Ok(valuation) => Some(valuation),
                Err(e) => {
                    log::warn!("Skipping {}: {}", record.name, e);
                    None
                }
            })
            .collect()
    }
}

impl Default for PortfolioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Totals across a set of valuations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub lease_count: usize,
    pub total_investment: f64,
    pub total_annual_rent: f64,
    pub total_present_value: f64,
    pub average_multiple: f64,
    /// Term weighted by annual rent
    pub weighted_term_years: f64,
    pub competitive_count: usize,
    pub risk_breakdown: BTreeMap<RiskTier, usize>,
}

impl PortfolioSummary {
    pub fn from_valuations(valuations: &[LeaseValuation]) -> Self {
        if valuations.is_empty() {
            return Self::default();
        }

        let count = valuations.len();
        let total_annual_rent: f64 = valuations.iter().map(|v| v.annual_rent).sum();
        let weighted_term_years = if total_annual_rent > 0.0 {
            valuations
                .iter()
                .map(|v| v.term_years as f64 * v.annual_rent)
                .sum::<f64>()
                / total_annual_rent
        } else {
            0.0
        };

        let mut risk_breakdown = BTreeMap::new();
        for v in valuations {
            *risk_breakdown.entry(v.risk_tier).or_insert(0) += 1;
        }

        Self {
            lease_count: count,
            total_investment: valuations.iter().map(|v| v.final_offer).sum(),
            total_annual_rent,
            total_present_value: valuations.iter().map(|v| v.present_value).sum(),
            average_multiple: valuations.iter().map(|v| v.multiple).sum::<f64>() / count as f64,
            weighted_term_years,
            competitive_count: valuations.iter().filter(|v| v.competitive).count(),
            risk_breakdown,
        }
    }
}
