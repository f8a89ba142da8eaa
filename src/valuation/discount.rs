//! Present value of annual cash-flow streams
//!
//! Payments are treated as received at the end of each year: the first
//! element is discounted one full year, the second two, and so on.

/// Present value of annual cash flows paid in arrears.
///
/// `PV = Σ cash_flows[i] / (1 + rate)^(i + 1)`. A zero rate reduces to a plain
/// sum and an empty series is worth nothing. Negative rates are not rejected.
pub fn present_value(cash_flows: &[f64], discount_rate: f64) -> f64 {
    if discount_rate == 0.0 {
        return undiscounted_total(cash_flows);
    }

    cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + discount_rate).powi(i as i32 + 1))
        .sum()
}

/// Nominal sum of the stream
pub fn undiscounted_total(cash_flows: &[f64]) -> f64 {
    cash_flows.iter().sum()
}

/// Discount factor for a payment `years` years out
pub fn discount_factor(discount_rate: f64, years: u32) -> f64 {
    (1.0 + discount_rate).powi(-(years as i32))
}
