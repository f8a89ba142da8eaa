//! Load extracted lease terms from JSON or CSV

use csv::Reader;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{Escalation, LeaseParams};
use crate::error::{LeaseError, Result};
use crate::pricing::RiskTier;

/// Lease terms as they arrive from extraction or manual review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    #[serde(default)]
    pub name: String,

    pub annual_rent: f64,

    pub term_years: u32,

    #[serde(default)]
    pub escalator: f64,

    /// Per-year escalators; takes precedence over `escalator`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_escalators: Option<Vec<f64>>,

    #[serde(default)]
    pub balloon_cost: f64,

    #[serde(default)]
    pub risk_tier: RiskTier,
}

impl LeaseRecord {
    pub fn new(name: impl Into<String>, annual_rent: f64, term_years: u32) -> Self {
        Self {
            name: name.into(),
            annual_rent,
            term_years,
            escalator: 0.0,
            custom_escalators: None,
            balloon_cost: 0.0,
            risk_tier: RiskTier::default(),
        }
    }

    pub fn escalation(&self) -> Escalation {
        match &self.custom_escalators {
            Some(rates) => Escalation::Schedule(rates.clone()),
            None => Escalation::Uniform(self.escalator),
        }
    }

    /// Build validated lease parameters
    pub fn to_params(&self) -> Result<LeaseParams> {
        if !self.annual_rent.is_finite() || self.annual_rent < 0.0 {
            return Err(self.invalid("annual_rent", format!("must be a non-negative amount, got {}", self.annual_rent)));
        }
        if !self.escalator.is_finite() {
            return Err(self.invalid("escalator", "must be finite".to_string()));
        }
        if !self.balloon_cost.is_finite() {
            return Err(self.invalid("balloon_cost", "must be finite".to_string()));
        }

        let params = LeaseParams::new(self.annual_rent, self.term_years)
            .with_escalation(self.escalation())
            .with_balloon_cost(self.balloon_cost);
        params.validate()?;
        Ok(params)
    }

    fn invalid(&self, field: &'static str, reason: String) -> LeaseError {
        LeaseError::InvalidRecord {
            name: self.name.clone(),
            field,
            reason,
        }
    }
}

/// A JSON file holds either one lease or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLeases {
    Many(Vec<LeaseRecord>),
    One(LeaseRecord),
}

/// Raw CSV row; only rent and term are required columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    annual_rent: f64,
    term_years: u32,
    #[serde(default)]
    escalator: Option<f64>,
    #[serde(default)]
    risk_tier: Option<String>,
    #[serde(default)]
    balloon_cost: Option<f64>,
}

impl CsvRow {
    fn into_record(self, row_number: usize) -> LeaseRecord {
        LeaseRecord {
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Deal_{}", row_number)),
            annual_rent: self.annual_rent,
            term_years: self.term_years,
            escalator: self.escalator.unwrap_or(0.0),
            custom_escalators: None,
            balloon_cost: self.balloon_cost.unwrap_or(0.0),
            risk_tier: self
                .risk_tier
                .as_deref()
                .map(RiskTier::parse_or_default)
                .unwrap_or_default(),
        }
    }
}

/// Load one lease or an array of leases from a JSON file.
/// Unnamed leases take the file stem as their name.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<LeaseRecord>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let parsed: JsonLeases = serde_json::from_reader(reader)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lease".to_string());

    let mut records = match parsed {
        JsonLeases::Many(records) => records,
        JsonLeases::One(record) => vec![record],
    };
    let multiple = records.len() > 1;
    for (i, record) in records.iter_mut().enumerate() {
        if record.name.trim().is_empty() {
            record.name = if multiple { format!("{}_{}", stem, i + 1) } else { stem.clone() };
        }
    }

    Ok(records)
}

/// Load leases from a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LeaseRecord>> {
    let file = File::open(path)?;
    load_csv_from_reader(file)
}

/// Load leases from any reader (e.g., string buffer, network stream)
pub fn load_csv_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LeaseRecord>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.into_record(records.len() + 1));
    }

    Ok(records)
}

/// Load by extension: `.json` or `.csv`
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<LeaseRecord>> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "json" => load_json(path),
        Some(ext) if ext == "csv" => load_csv(path),
        _ => Err(LeaseError::InvalidRecord {
            name: path.display().to_string(),
            field: "path",
            reason: "must end in .json or .csv".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_from_reader() {
        let data = "\
name,annual_rent,term_years,escalator,risk_tier,balloon_cost
Lanceleaf,95680,23,0.025,medium,
,230000,25,0.015,LOW,40000
Sullivan,50000,25,,bogus,
";
        let records = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "Lanceleaf");
        assert_eq!(records[0].escalator, 0.025);
        assert_eq!(records[0].balloon_cost, 0.0);

        assert_eq!(records[1].name, "Deal_2");
        assert_eq!(records[1].risk_tier, RiskTier::Low);
        assert_eq!(records[1].balloon_cost, 40_000.0);

        assert_eq!(records[2].escalator, 0.0);
        assert_eq!(records[2].risk_tier, RiskTier::Medium);
    }

    #[test]
    fn test_csv_minimal_columns() {
        let data = "annual_rent,term_years\n1000,5\n";
        let records = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records, vec![LeaseRecord::new("Deal_1", 1000.0, 5)]);
    }

    #[test]
    fn test_csv_rejects_bad_number() {
        let data = "annual_rent,term_years\nlots,5\n";
        let err = load_csv_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LeaseError::Csv(_)));
    }

    #[test]
    fn test_json_single_and_array() {
        let single: JsonLeases = serde_json::from_str(
            r#"{"name": "Laramie", "annual_rent": 230000, "term_years": 25, "escalator": 0.015, "risk_tier": "low"}"#,
        )
        .unwrap();
        assert!(matches!(single, JsonLeases::One(ref r) if r.risk_tier == RiskTier::Low));

        let many: JsonLeases = serde_json::from_str(
            r#"[{"annual_rent": 1000, "term_years": 3, "custom_escalators": [0.01, 0.02, 0.03]},
                {"annual_rent": 2000, "term_years": 4}]"#,
        )
        .unwrap();
        match many {
            JsonLeases::Many(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].escalation(), Escalation::Schedule(vec![0.01, 0.02, 0.03]));
                assert_eq!(records[1].escalation(), Escalation::Uniform(0.0));
            }
            JsonLeases::One(_) => panic!("expected an array"),
        }
    }

    #[test]
    fn test_json_risk_tier_is_lenient() {
        let records: Vec<LeaseRecord> = serde_json::from_str(
            r#"[{"annual_rent": 1000, "term_years": 3, "risk_tier": "High"},
                {"annual_rent": 1000, "term_years": 3, "risk_tier": "speculative"},
                {"annual_rent": 1000, "term_years": 3}]"#,
        )
        .unwrap();
        let tiers: Vec<_> = records.iter().map(|r| r.risk_tier).collect();
        assert_eq!(tiers, vec![RiskTier::High, RiskTier::Medium, RiskTier::Medium]);
    }

    #[test]
    fn test_load_json_file_names_leases() {
        let dir = std::env::temp_dir().join(format!("lease_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("illinois.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"annual_rent": 95680, "term_years": 23, "escalator": 0.025}}"#).unwrap();
        drop(file);

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "illinois");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_records("lease.pdf").unwrap_err();
        assert!(matches!(err, LeaseError::InvalidRecord { field: "path", .. }));
    }

    #[test]
    fn test_to_params_validation() {
        let mut record = LeaseRecord::new("bad", -5.0, 10);
        assert!(matches!(
            record.to_params(),
            Err(LeaseError::InvalidRecord { field: "annual_rent", .. })
        ));

        record.annual_rent = 1000.0;
        record.custom_escalators = Some(vec![0.01]);
        assert!(matches!(
            record.to_params(),
            Err(LeaseError::EscalatorLengthMismatch { term_years: 10, schedule_len: 1 })
        ));

        record.custom_escalators = None;
        record.balloon_cost = 250.0;
        let params = record.to_params().unwrap();
        assert_eq!(params.balloon_cost(), 250.0);
        assert_eq!(params.term_years(), 10);
    }
}
