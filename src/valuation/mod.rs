//! Valuation engine: discounting, buyout pricing, and investor IRR

mod discount;
mod buyout;
mod irr;

pub use discount::{present_value, undiscounted_total, discount_factor};
pub use buyout::{pv_buyout, round_cents, BuyoutValuation};
pub use irr::{solve_irr, irr, investor_cash_flows, buyout_irr, IrrOptions, IrrSolution, MIN_RATE, MAX_RATE};
