//! Lease parameters, cash-flow generation, and record loading

mod params;
pub mod loader;

pub use params::{LeaseParams, Escalation, generate_cash_flows};
pub use loader::{LeaseRecord, load_json, load_csv, load_csv_from_reader, load_records};
