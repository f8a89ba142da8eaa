//! Lease Valuation CLI
//!
//! Values a single lease from flags, one or more leases from a JSON file, or a
//! batch from CSV, and prints the buyout offers.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use lease_valuation::pricing::multiple;
use lease_valuation::{
    LeaseRecord, LeaseValuation, PortfolioRunner, PortfolioSummary, RiskTier, ValuationConfig,
};
use lease_valuation::lease::{load_csv, load_json};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Ground-lease buyout valuation
#[derive(Parser)]
#[command(name = "lease-valuation", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["annual_rent", "input", "batch"])))]
struct Cli {
    /// Annual rent in dollars
    #[arg(long)]
    annual_rent: Option<f64>,

    /// JSON file with one lease or an array of leases
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV file with one lease per row
    #[arg(long)]
    batch: Option<PathBuf>,

    /// Lease term in years
    #[arg(long, default_value_t = 25)]
    years: u32,

    /// Annual escalator (e.g. 0.025 for 2.5%)
    #[arg(long, default_value_t = 0.0)]
    escalator: f64,

    /// One-off cost in the final year (negative for a bonus)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    balloon_cost: f64,

    /// Counterparty risk tier: low, medium, high
    #[arg(long, default_value = "medium")]
    risk_tier: RiskTier,

    /// Flat discount rate for every lease (disables the risk/size policy)
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Flat share of PV offered (disables the risk/size policy)
    #[arg(long)]
    buyout_pct: Option<f64>,

    /// Use flat pricing from LEASE_DISCOUNT_RATE / LEASE_BUYOUT_PCT (or 10% / 85%)
    #[arg(long)]
    fixed_pricing: bool,

    #[arg(long, value_enum, default_value = "human")]
    output_format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Csv,
}

impl Cli {
    fn runner(&self) -> PortfolioRunner {
        if self.fixed_pricing || self.discount_rate.is_some() || self.buyout_pct.is_some() {
            let base = ValuationConfig::from_env();
            PortfolioRunner::fixed(ValuationConfig::new(
                self.discount_rate.unwrap_or(base.discount_rate),
                self.buyout_pct.unwrap_or(base.buyout_pct),
            ))
        } else {
            PortfolioRunner::new()
        }
    }

    fn records(&self) -> Result<Vec<LeaseRecord>> {
        if let Some(path) = &self.input {
            return load_json(path).with_context(|| format!("Failed to load {}", path.display()));
        }
        if let Some(path) = &self.batch {
            return load_csv(path).with_context(|| format!("Failed to load {}", path.display()));
        }

        let annual_rent = self.annual_rent.context("--annual-rent is required")?;
        Ok(vec![LeaseRecord {
            escalator: self.escalator,
            balloon_cost: self.balloon_cost,
            risk_tier: self.risk_tier,
            ..LeaseRecord::new("Lease", annual_rent, self.years)
        }])
    }
}

/// Flat CSV row; nested IRR fields are spread into columns
#[derive(Serialize)]
struct CsvOutputRow<'a> {
    name: &'a str,
    annual_rent: f64,
    term_years: u32,
    escalator: f64,
    risk_tier: RiskTier,
    discount_rate: f64,
    buyout_pct: f64,
    present_value: f64,
    final_offer: f64,
    multiple: f64,
    competitiveness_pct: f64,
    competitive: bool,
    irr: f64,
    irr_converged: bool,
}

impl<'a> From<&'a LeaseValuation> for CsvOutputRow<'a> {
    fn from(v: &'a LeaseValuation) -> Self {
        Self {
            name: &v.name,
            annual_rent: v.annual_rent,
            term_years: v.term_years,
            escalator: v.escalator,
            risk_tier: v.risk_tier,
            discount_rate: v.discount_rate,
            buyout_pct: v.buyout_pct,
            present_value: round_to(v.present_value, 2),
            final_offer: v.final_offer,
            multiple: round_to(v.multiple, 1),
            competitiveness_pct: round_to(v.competitiveness_pct, 1),
            competitive: v.competitive,
            irr: round_to(v.irr.rate, 6),
            irr_converged: v.irr.converged,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Format whole dollars with thousands separators
fn dollars(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-${}", out)
    } else {
        format!("${}", out)
    }
}

fn write_human(out: &mut dyn Write, v: &LeaseValuation, benchmark_multiple: f64) -> io::Result<()> {
    let status = if v.competitive { "COMPETITIVE" } else { "BELOW MARKET" };
    let irr_note = if v.irr.converged { "" } else { " (not converged)" };

    writeln!(out)?;
    writeln!(out, "Lease Valuation: {}", v.name)?;
    writeln!(out, "{}", "=".repeat(34))?;
    writeln!(out, "Annual Rent: {}", dollars(v.annual_rent))?;
    writeln!(out, "Term: {} years", v.term_years)?;
    writeln!(out, "Escalator: {:.1}%", v.escalator * 100.0)?;
    writeln!(out, "Risk Tier: {} ({:.0}% discount rate)", v.risk_tier, v.discount_rate * 100.0)?;
    writeln!(out)?;
    writeln!(out, "OFFER CALCULATION:")?;
    writeln!(out, "Undiscounted Rent: {}", dollars(v.undiscounted_value))?;
    writeln!(out, "Present Value: {}", dollars(v.present_value))?;
    writeln!(out, "Base NPV Offer: {} ({:.0}% of NPV)", dollars(v.base_offer), v.buyout_pct * 100.0)?;
    writeln!(out, "Final Offer: {}", dollars(v.final_offer))?;
    writeln!(out, "Multiple: {:.1}x annual rent", v.multiple)?;
    writeln!(out, "Investor IRR: {:.2}%{}", v.irr.rate * 100.0, irr_note)?;
    writeln!(out)?;
    writeln!(out, "COMPETITIVENESS:")?;
    writeln!(out, "Benchmark: {} ({:.1}x)", dollars(v.benchmark), benchmark_multiple)?;
    writeln!(out, "Our Position: {:.1}% of benchmark", v.competitiveness_pct)?;
    writeln!(out, "Status: {}", status)?;
    Ok(())
}

fn write_summary(out: &mut dyn Write, summary: &PortfolioSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "PORTFOLIO TOTALS:")?;
    writeln!(out, "Leases: {} ({} competitive)", summary.lease_count, summary.competitive_count)?;
    writeln!(out, "Total Investment: {}", dollars(summary.total_investment))?;
    writeln!(out, "Total Present Value: {}", dollars(summary.total_present_value))?;
    writeln!(out, "Total Annual Rent: {}", dollars(summary.total_annual_rent))?;
    writeln!(out, "Average Multiple: {:.1}x", summary.average_multiple)?;
    writeln!(out, "Weighted Term: {:.1} years", summary.weighted_term_years)?;
    for (tier, count) in &summary.risk_breakdown {
        writeln!(out, "  {} risk: {}", tier, count)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runner = cli.runner();
    let records = cli.records()?;
    log::info!("Valuing {} lease(s) with {:?} pricing", records.len(), runner.pricing());

    let valuations = runner.value_batch(&records);
    if valuations.is_empty() {
        anyhow::bail!("No leases could be valued");
    }
    let summary = PortfolioSummary::from_valuations(&valuations);

    let mut out: Box<dyn Write> = match &cli.output_file {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    match cli.output_format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &valuations)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for v in &valuations {
                writer.serialize(CsvOutputRow::from(v))?;
            }
            writer.flush()?;
        }
        OutputFormat::Human => {
            let benchmark_multiple = runner.policy().benchmark_multiple;
            for v in &valuations {
                write_human(&mut out, v, benchmark_multiple)?;
            }
            if valuations.len() > 1 {
                write_summary(&mut out, &summary)?;
            }
        }
    }
    out.flush()?;

    if let Some(path) = &cli.output_file {
        println!("Results written to {}", path.display());
    }

    log::info!(
        "Total recommended investment {} ({:.1}x average rent multiple, {:.1}x on total rent)",
        dollars(summary.total_investment),
        summary.average_multiple,
        multiple(summary.total_investment, summary.total_annual_rent),
    );

    Ok(())
}
