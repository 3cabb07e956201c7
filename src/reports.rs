use serde::Serialize;

use crate::error::{ForensicError, Result};
use crate::fmt::{ratio, score_2dp, score_out_of};
use crate::interpret::{interpret, Tone, Verdict};
use crate::models::{CompanySeries, Dataset};

// ---------------------------------------------------------------------------
// Company report — everything one dashboard page shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub title: &'static str,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerdictBanner {
    pub verdict: Verdict,
    pub label: String,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccrualPanel {
    pub zone: String,
    pub tone: Tone,
    pub color: &'static str,
    pub cf_accrual_ratio: String,
    pub bs_accrual_ratio: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub f_score: f64,
    pub c_score: f64,
    pub o_score: f64,
    pub cfo: f64,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub company: String,
    pub latest_year: i32,
    pub first_year: i32,
    pub scorecards: [Scorecard; 3],
    pub verdict: VerdictBanner,
    pub accrual: AccrualPanel,
    /// Full series, ascending by year; feeds both charts.
    pub trend: Vec<TrendPoint>,
}

impl CompanyReport {
    pub fn from_series(series: &CompanySeries) -> Self {
        let latest = series.latest();
        let labels = interpret(latest);

        let scorecards = [
            Scorecard {
                title: "Piotroski F-Score",
                value: score_out_of(latest.f_score, 9),
                label: labels.f_label.to_string(),
            },
            Scorecard {
                title: "Montier C-Score",
                value: score_out_of(latest.c_score, 6),
                label: labels.c_label.to_string(),
            },
            Scorecard {
                title: "Ohlson O-Score",
                value: score_2dp(latest.o_score),
                label: labels.o_label.to_string(),
            },
        ];

        let trend = series
            .records()
            .iter()
            .map(|r| TrendPoint {
                year: r.year,
                f_score: r.f_score,
                c_score: r.c_score,
                o_score: r.o_score,
                cfo: r.cfo,
                net_income: r.net_income,
            })
            .collect();

        Self {
            company: series.company().to_string(),
            latest_year: latest.year,
            first_year: series.first_year(),
            scorecards,
            verdict: VerdictBanner {
                verdict: labels.verdict,
                label: labels.verdict.to_string(),
                tone: labels.verdict_tone,
                color: labels.verdict_tone.hex(),
            },
            accrual: AccrualPanel {
                zone: latest.accrual_zone.to_string(),
                tone: labels.zone_tone,
                color: labels.zone_tone.hex(),
                cf_accrual_ratio: ratio(latest.cf_accrual_ratio),
                bs_accrual_ratio: ratio(latest.bs_accrual_ratio),
                interpretation: latest.accrual_interpretation.clone(),
            },
            trend,
        }
    }
}

/// Build the report for one company: its full series plus labels for the
/// latest year.
pub fn build_company_report(dataset: &Dataset, company: &str) -> Result<CompanyReport> {
    let series = dataset.series(company)?;
    tracing::debug!(company, years = series.records().len(), "building company report");
    Ok(CompanyReport::from_series(&series))
}

/// Resolve the requested company, defaulting to the first one in the file.
pub fn resolve_company<'a>(dataset: &'a Dataset, requested: Option<&'a str>) -> Result<&'a str> {
    if dataset.is_empty() {
        return Err(ForensicError::EmptyDataset(
            dataset.source.display().to_string(),
        ));
    }
    match requested {
        Some(name) => Ok(name),
        None => dataset
            .companies()
            .first()
            .copied()
            .ok_or_else(|| ForensicError::EmptyDataset(dataset.source.display().to_string())),
    }
}

// ---------------------------------------------------------------------------
// Company overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CompanyRow {
    pub company: String,
    pub records: usize,
    pub first_year: i32,
    pub latest_year: i32,
    pub verdict: Verdict,
    pub tone: Tone,
}

pub fn company_overview(dataset: &Dataset) -> Result<Vec<CompanyRow>> {
    if dataset.is_empty() {
        return Err(ForensicError::EmptyDataset(
            dataset.source.display().to_string(),
        ));
    }
    dataset
        .companies()
        .into_iter()
        .map(|name| {
            let series = dataset.series(name)?;
            let labels = interpret(series.latest());
            Ok(CompanyRow {
                company: name.to_string(),
                records: series.records().len(),
                first_year: series.first_year(),
                latest_year: series.latest().year,
                verdict: labels.verdict,
                tone: labels.verdict_tone,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::models::test_support::{acme_dataset, record};
    use crate::models::AccrualZone;

    #[test]
    fn test_acme_uses_latest_year() {
        let ds = acme_dataset();
        let report = build_company_report(&ds, "Acme").unwrap();
        assert_eq!(report.latest_year, 2023);
        assert_eq!(report.first_year, 2022);
        assert_eq!(report.scorecards[0].label, "Weak");
        assert_eq!(report.scorecards[1].label, "High Risk");
        assert_eq!(report.scorecards[2].label, "At Risk");
        assert_eq!(report.verdict.verdict, Verdict::HighForensicRisk);
        assert_eq!(report.verdict.label, "High Forensic Risk");
        assert_eq!(report.verdict.tone, Tone::Red);
        assert_eq!(report.verdict.color, "#7a1f1f");
    }

    #[test]
    fn test_scorecard_values() {
        let ds = acme_dataset();
        let report = build_company_report(&ds, "Acme").unwrap();
        assert_eq!(report.scorecards[0].title, "Piotroski F-Score");
        assert_eq!(report.scorecards[0].value, "3 / 9");
        assert_eq!(report.scorecards[1].value, "5 / 6");
        assert_eq!(report.scorecards[2].value, "3.2");
    }

    #[test]
    fn test_trend_is_ascending_full_series() {
        let ds = acme_dataset();
        let report = build_company_report(&ds, "Acme").unwrap();
        let years: Vec<i32> = report.trend.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2023]);
        assert_eq!(report.trend[0].f_score, 8.0);
        assert_eq!(report.trend[1].o_score, 3.2);
    }

    #[test]
    fn test_accrual_panel() {
        let mut r = record("Initech", 2024, 6.0, 2.0, 0.2);
        r.accrual_zone = AccrualZone::Other("Other/Low-Quality".into());
        r.cf_accrual_ratio = -0.12345;
        r.bs_accrual_ratio = 0.2;
        let ds = Dataset {
            source: PathBuf::from("x.csv"),
            records: vec![r],
        };
        let report = build_company_report(&ds, "Initech").unwrap();
        assert_eq!(report.accrual.zone, "Other/Low-Quality");
        assert_eq!(report.accrual.tone, Tone::Red);
        assert_eq!(report.accrual.cf_accrual_ratio, "-0.123");
        assert_eq!(report.accrual.bs_accrual_ratio, "0.200");
        assert_eq!(report.verdict.verdict, Verdict::WatchlistCompany);
    }

    #[test]
    fn test_unknown_company() {
        let ds = acme_dataset();
        assert!(matches!(
            build_company_report(&ds, "Nobody"),
            Err(ForensicError::UnknownCompany(_))
        ));
    }

    #[test]
    fn test_resolve_company_defaults_to_first() {
        let ds = acme_dataset();
        assert_eq!(resolve_company(&ds, None).unwrap(), "Acme");
        assert_eq!(resolve_company(&ds, Some("Globex")).unwrap(), "Globex");
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset {
            source: PathBuf::from("empty.csv"),
            records: Vec::new(),
        };
        assert!(matches!(resolve_company(&ds, None), Err(ForensicError::EmptyDataset(_))));
        assert!(matches!(company_overview(&ds), Err(ForensicError::EmptyDataset(_))));
    }

    #[test]
    fn test_company_overview() {
        let ds = acme_dataset();
        let rows = company_overview(&ds).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company, "Acme");
        assert_eq!(rows[0].records, 2);
        assert_eq!(rows[0].latest_year, 2023);
        assert_eq!(rows[0].verdict, Verdict::HighForensicRisk);
        assert_eq!(rows[1].company, "Globex");
        assert_eq!(rows[1].verdict, Verdict::FinanciallyHealthy);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let ds = acme_dataset();
        let report = build_company_report(&ds, "Acme").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["verdict"]["tone"], "red");
        assert_eq!(json["verdict"]["label"], "High Forensic Risk");
        assert_eq!(json["latest_year"], 2023);
        assert_eq!(json["first_year"], 2022);
        assert_eq!(json["verdict"]["verdict"], "HighForensicRisk");
        assert_eq!(json["verdict"]["color"], "#7a1f1f");
        assert_eq!(json["scorecards"][0]["title"], "Piotroski F-Score");
        assert_eq!(json["scorecards"][0]["value"], "3 / 9");
        assert_eq!(json["accrual"]["zone"], "High-Quality Earnings");
        assert_eq!(json["accrual"]["color"], "#1f7a1f");
        assert_eq!(json["accrual"]["cf_accrual_ratio"], "0.050");
        assert_eq!(json["accrual"]["bs_accrual_ratio"], "0.020");

        let trend = json["trend"].as_array().unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0]["year"], 2022);
        for key in ["f_score", "c_score", "o_score", "cfo", "net_income"] {
            assert!(trend[1][key].is_number(), "{key}");
        }
        assert_eq!(trend[1]["cfo"], 1000.0);
    }
}
