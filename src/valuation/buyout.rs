//! Buyout offer: present value scaled by the buyout percentage

use serde::{Deserialize, Serialize};

use super::discount::{present_value, undiscounted_total};
use crate::error::Result;
use crate::lease::LeaseParams;
use crate::pricing::ValuationConfig;

/// Round to currency-cent precision
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Cash offer for a lease: PV at `config.discount_rate` times `config.buyout_pct`,
/// rounded once to cents.
///
/// Lease terms come in through `params`: `annual_rent` and `term_years` via
/// [`LeaseParams::new`], a uniform escalator via `with_escalator`, per-year
/// `custom_escalators` via `with_schedule`, and `balloon_cost` via
/// `with_balloon_cost`. `discount_rate` and `buyout_pct` come from `config`.
///
/// ```
/// use lease_valuation::{pv_buyout, LeaseParams, ValuationConfig};
///
/// let params = LeaseParams::new(95_680.0, 23).with_escalator(0.025);
/// let offer = pv_buyout(&params, &ValuationConfig::new(0.10, 0.85)).unwrap();
/// assert!(offer / 95_680.0 > 6.0 && offer / 95_680.0 < 10.0);
/// ```
pub fn pv_buyout(params: &LeaseParams, config: &ValuationConfig) -> Result<f64> {
    let cash_flows = params.cash_flows()?;
    let pv = present_value(&cash_flows, config.discount_rate);
    Ok(round_cents(pv * config.buyout_pct))
}

/// Every intermediate of a buyout calculation, unrounded except for the offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyoutValuation {
    pub cash_flows: Vec<f64>,
    pub undiscounted_value: f64,
    pub present_value: f64,
    pub offer: f64,
    pub config: ValuationConfig,
}

impl BuyoutValuation {
    /// Run the full chain once, keeping the cash flows and PV for reporting
    pub fn compute(params: &LeaseParams, config: &ValuationConfig) -> Result<Self> {
        let cash_flows = params.cash_flows()?;
        let present_value = present_value(&cash_flows, config.discount_rate);
        let undiscounted_value = undiscounted_total(&cash_flows);

        Ok(Self {
            offer: round_cents(present_value * config.buyout_pct),
            cash_flows,
            undiscounted_value,
            present_value,
            config: *config,
        })
    }

    /// Re-scale the same present value at another percentage
    pub fn offer_at(&self, buyout_pct: f64) -> f64 {
        round_cents(self.present_value * buyout_pct)
    }
}
