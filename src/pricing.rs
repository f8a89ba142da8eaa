//! Valuation configuration and the competitive pricing policy
//!
//! `ValuationConfig` is the pair of knobs every buyout calculation needs.
//! `PricingPolicy` derives that pair from a lease's risk tier and size, and
//! holds the multiple floor and market benchmark used to judge an offer.

use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Pipeline default discount rate (10%)
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;

/// Pipeline default share of present value offered (85%)
pub const DEFAULT_BUYOUT_PCT: f64 = 0.85;

/// Discount rate and buyout percentage applied to one valuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Annual discount rate as a decimal (0.10 = 10%)
    pub discount_rate: f64,

    /// Fraction of present value offered as the lump sum
    pub buyout_pct: f64,
}

impl ValuationConfig {
    pub fn new(discount_rate: f64, buyout_pct: f64) -> Self {
        Self {
            discount_rate,
            buyout_pct,
        }
    }

    /// Read `LEASE_DISCOUNT_RATE` and `LEASE_BUYOUT_PCT`, falling back to the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            discount_rate: env_f64("LEASE_DISCOUNT_RATE").unwrap_or(defaults.discount_rate),
            buyout_pct: env_f64("LEASE_BUYOUT_PCT").unwrap_or(defaults.buyout_pct),
        }
    }
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOUNT_RATE, DEFAULT_BUYOUT_PCT)
    }
}

fn env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}

/// Counterparty risk bucket used to pick a discount rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Investment-grade or municipal counterparty
    Low,
    #[default]
    Medium,
    /// Unknown or thinly capitalised counterparty
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    /// Parse leniently; anything unrecognised is treated as medium risk
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; unknown tiers deserialize as medium risk
impl<'de> Deserialize<'de> for RiskTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RiskTier::parse_or_default(&raw))
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(format!("Unknown risk tier: {}", other)),
        }
    }
}

/// Buyout percentage for deals whose annual rent is below `max_rent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBand {
    pub max_rent: f64,
    pub buyout_pct: f64,
}

/// Competitive pricing rules applied on top of the DCF value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub low_risk_rate: f64,
    pub medium_risk_rate: f64,
    pub high_risk_rate: f64,

    /// Ascending rent bands; the first band whose `max_rent` exceeds the rent wins
    pub size_bands: Vec<SizeBand>,

    /// Buyout percentage for rents above every band
    pub large_deal_pct: f64,

    /// Offers never fall below this multiple of annual rent
    pub min_multiple: f64,

    /// Multiple a leading competitor typically pays
    pub benchmark_multiple: f64,

    /// Share of the benchmark (in percent) at which an offer counts as competitive
    pub competitive_threshold_pct: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            low_risk_rate: 0.08,
            medium_risk_rate: 0.12,
            high_risk_rate: 0.16,
            size_bands: vec![
                SizeBand { max_rent: 100_000.0, buyout_pct: 0.95 },
                SizeBand { max_rent: 500_000.0, buyout_pct: 0.90 },
            ],
            large_deal_pct: 0.85,
            min_multiple: 8.0,
            benchmark_multiple: 12.5,
            competitive_threshold_pct: 75.0,
        }
    }
}

impl PricingPolicy {
    pub fn discount_rate(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low_risk_rate,
            RiskTier::Medium => self.medium_risk_rate,
            RiskTier::High => self.high_risk_rate,
        }
    }

    /// Smaller deals get a larger share of PV to stay competitive
    pub fn buyout_pct(&self, annual_rent: f64) -> f64 {
        self.size_bands
            .iter()
            .find(|band| annual_rent < band.max_rent)
            .map(|band| band.buyout_pct)
            .unwrap_or(self.large_deal_pct)
    }

    pub fn config_for(&self, tier: RiskTier, annual_rent: f64) -> ValuationConfig {
        ValuationConfig::new(self.discount_rate(tier), self.buyout_pct(annual_rent))
    }

    /// Raise an offer to the minimum multiple of rent
    pub fn apply_floor(&self, offer: f64, annual_rent: f64) -> f64 {
        if annual_rent <= 0.0 {
            return offer;
        }
        offer.max(annual_rent * self.min_multiple)
    }

    pub fn benchmark(&self, annual_rent: f64) -> f64 {
        annual_rent * self.benchmark_multiple
    }

    /// Offer as a percentage of the competitor benchmark (0 when there is no rent)
    pub fn competitiveness_pct(&self, offer: f64, annual_rent: f64) -> f64 {
        let benchmark = self.benchmark(annual_rent);
        if benchmark > 0.0 {
            offer / benchmark * 100.0
        } else {
            0.0
        }
    }

    pub fn is_competitive(&self, competitiveness_pct: f64) -> bool {
        competitiveness_pct >= self.competitive_threshold_pct
    }
}

/// Offer expressed as a multiple of annual rent
pub fn multiple(offer: f64, annual_rent: f64) -> f64 {
    if annual_rent > 0.0 {
        offer / annual_rent
    } else {
        0.0
    }
}
