use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ForensicError, Result};

/// Earnings-quality bucket computed upstream from the two accrual ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AccrualZone {
    HighQuality,
    EarlyWarning,
    AssetHeavy,
    /// Anything else, kept verbatim for display.
    Other(String),
}

impl AccrualZone {
    pub const HIGH_QUALITY: &'static str = "High-Quality Earnings";
    pub const EARLY_WARNING: &'static str = "Early Warning Zone";
    pub const ASSET_HEAVY: &'static str = "Asset-Heavy Operations";

    /// Exact, case-sensitive match; no trimming or fuzzy matching.
    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::HIGH_QUALITY => Self::HighQuality,
            Self::EARLY_WARNING => Self::EarlyWarning,
            Self::ASSET_HEAVY => Self::AssetHeavy,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::HighQuality => Self::HIGH_QUALITY,
            Self::EarlyWarning => Self::EARLY_WARNING,
            Self::AssetHeavy => Self::ASSET_HEAVY,
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for AccrualZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One company in one fiscal year.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub company: String,
    pub year: i32,
    pub f_score: f64,
    pub c_score: f64,
    pub o_score: f64,
    pub cfo: f64,
    pub net_income: f64,
    pub cf_accrual_ratio: f64,
    pub bs_accrual_ratio: f64,
    pub accrual_zone: AccrualZone,
    pub accrual_interpretation: String,
}

/// All records of one company, ascending by year.
#[derive(Debug, Clone)]
pub struct CompanySeries {
    company: String,
    records: Vec<FinancialRecord>,
}

impl CompanySeries {
    /// Returns `None` when `records` is empty. Equal years keep their input order.
    pub fn new(company: impl Into<String>, mut records: Vec<FinancialRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        records.sort_by_key(|r| r.year);
        Some(Self {
            company: company.into(),
            records,
        })
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn latest(&self) -> &FinancialRecord {
        // Non-empty by construction.
        &self.records[self.records.len() - 1]
    }

    pub fn first_year(&self) -> i32 {
        self.records[0].year
    }
}

/// Every record read from one input file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub records: Vec<FinancialRecord>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct company names in first-appearance order.
    pub fn companies(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for r in &self.records {
            if !seen.contains(&r.company.as_str()) {
                seen.push(&r.company);
            }
        }
        seen
    }

    pub fn series(&self, company: &str) -> Result<CompanySeries> {
        let records: Vec<FinancialRecord> = self
            .records
            .iter()
            .filter(|r| r.company == company)
            .cloned()
            .collect();
        CompanySeries::new(company, records)
            .ok_or_else(|| ForensicError::UnknownCompany(company.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn record(company: &str, year: i32, f: f64, c: f64, o: f64) -> FinancialRecord {
        FinancialRecord {
            company: company.to_string(),
            year,
            f_score: f,
            c_score: c,
            o_score: o,
            cfo: 1_000.0,
            net_income: 800.0,
            cf_accrual_ratio: 0.05,
            bs_accrual_ratio: 0.02,
            accrual_zone: AccrualZone::HighQuality,
            accrual_interpretation: "Cash earnings back reported profit.".to_string(),
        }
    }

    pub fn acme_dataset() -> Dataset {
        Dataset {
            source: PathBuf::from("acme.csv"),
            records: vec![
                record("Acme", 2023, 3.0, 5.0, 3.2),
                record("Globex", 2023, 8.0, 1.0, 0.4),
                record("Acme", 2022, 8.0, 0.0, 0.5),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_accrual_zone_parse_is_exact() {
        assert_eq!(AccrualZone::parse("High-Quality Earnings"), AccrualZone::HighQuality);
        assert_eq!(AccrualZone::parse("Early Warning Zone"), AccrualZone::EarlyWarning);
        assert_eq!(AccrualZone::parse("Asset-Heavy Operations"), AccrualZone::AssetHeavy);
        assert_eq!(
            AccrualZone::parse("high-quality earnings"),
            AccrualZone::Other("high-quality earnings".to_string())
        );
        assert_eq!(
            AccrualZone::parse("Early Warning Zone "),
            AccrualZone::Other("Early Warning Zone ".to_string())
        );
    }

    #[test]
    fn test_companies_in_first_appearance_order() {
        let ds = acme_dataset();
        assert_eq!(ds.companies(), vec!["Acme", "Globex"]);
    }

    #[test]
    fn test_series_sorted_and_latest() {
        let ds = acme_dataset();
        let series = ds.series("Acme").unwrap();
        let years: Vec<i32> = series.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2022, 2023]);
        assert_eq!(series.latest().year, 2023);
        assert_eq!(series.first_year(), 2022);
    }

    #[test]
    fn test_series_unknown_company() {
        let ds = acme_dataset();
        let err = ds.series("Initech").unwrap_err();
        assert!(matches!(err, ForensicError::UnknownCompany(ref c) if c == "Initech"));
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(CompanySeries::new("Acme", Vec::new()).is_none());
    }

    #[test]
    fn test_equal_years_keep_input_order() {
        let mut a = record("Acme", 2023, 1.0, 0.0, 0.0);
        a.accrual_interpretation = "first".into();
        let mut b = record("Acme", 2023, 2.0, 0.0, 0.0);
        b.accrual_interpretation = "second".into();
        let series = CompanySeries::new("Acme", vec![a, b]).unwrap();
        assert_eq!(series.latest().accrual_interpretation, "second");
    }
}
