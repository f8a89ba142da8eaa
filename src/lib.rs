//! Lease Valuation - Discounted-cash-flow buyout pricing for solar and wind ground leases
//!
//! This library provides:
//! - Yearly rent projection with uniform or per-year escalators and a terminal balloon
//! - Present value of rent paid in arrears
//! - Buyout offers as a percentage of present value, rounded to cents
//! - Investor IRR on a buyout via Newton-Raphson
//! - Risk- and size-based pricing policy and parallel portfolio valuation

pub mod error;
pub mod lease;
pub mod valuation;
pub mod pricing;
pub mod portfolio;

// Re-export commonly used types
pub use error::{LeaseError, Result};
pub use lease::{LeaseParams, Escalation, LeaseRecord, generate_cash_flows};
pub use valuation::{present_value, pv_buyout, solve_irr, irr, IrrOptions, IrrSolution};
pub use pricing::{ValuationConfig, PricingPolicy, RiskTier};
pub use portfolio::{PortfolioRunner, PortfolioSummary, LeaseValuation};
