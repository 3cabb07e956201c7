use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{load_with_settings, ReportFormat};
use crate::error::Result;
use crate::fmt::{amount, score_2dp};
use crate::interpret::Tone;
use crate::reports::{build_company_report, resolve_company, CompanyReport};
use crate::settings::get_export_dir;

pub fn run(
    file: &str,
    company: Option<&str>,
    format: ReportFormat,
    output: Option<String>,
    export: bool,
    sheet: Option<&str>,
) -> Result<()> {
    let dataset = load_with_settings(file, sheet)?;
    let company = resolve_company(&dataset, company)?;
    let report = build_company_report(&dataset, company)?;

    let to_file = output.is_some() || export;
    if to_file || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    let body = render(&report, format)?;

    let path = match (output, export) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, true) => Some(default_export_path(&report.company, format)),
        (None, false) => None,
    };
    match path {
        Some(p) => {
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&p, format!("{body}\n"))?;
            println!("Wrote {}", p.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

pub fn render(report: &CompanyReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(format_report(report)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn default_export_path(company: &str, format: ReportFormat) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let slug: String = company
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    get_export_dir().join(format!("{slug}-{date}.{}", format.extension()))
}

fn toned(text: &str, tone: Tone) -> colored::ColoredString {
    let (r, g, b) = tone.rgb();
    format!(" {text} ").as_str().white().bold().on_truecolor(r, g, b)
}

// ---------------------------------------------------------------------------
// Pure formatting (report → String)
// ---------------------------------------------------------------------------

pub fn format_report(report: &CompanyReport) -> String {
    let mut out = format!(
        "Forensic Financial Health \u{2014} {} (FY {})\n",
        report.company.as_str().bold(),
        report.latest_year
    );

    let mut cards = Table::new();
    cards.set_header(vec!["Score", "Value", "Reading"]);
    for card in &report.scorecards {
        cards.add_row(vec![
            Cell::new(card.title),
            Cell::new(&card.value),
            Cell::new(&card.label),
        ]);
    }
    out.push_str(&format!("{cards}\n\n"));

    out.push_str(&format!(
        "Overall Interpretation: {}\n\n",
        toned(&report.verdict.label, report.verdict.tone)
    ));

    let accrual = &report.accrual;
    let mut zone = Table::new();
    zone.set_header(vec!["Earnings Quality (Accrual Analysis)", ""]);
    zone.add_row(vec![
        Cell::new("Accrual Zone"),
        Cell::new(toned(&accrual.zone, accrual.tone)),
    ]);
    zone.add_row(vec![
        Cell::new("Cash-Flow Accrual Ratio"),
        Cell::new(&accrual.cf_accrual_ratio),
    ]);
    zone.add_row(vec![
        Cell::new("Balance-Sheet Accrual Ratio"),
        Cell::new(&accrual.bs_accrual_ratio),
    ]);
    if !accrual.interpretation.is_empty() {
        zone.add_row(vec![Cell::new("Note"), Cell::new(&accrual.interpretation)]);
    }
    out.push_str(&format!("{zone}\n\n"));

    let mut trend = Table::new();
    trend.set_header(vec!["Year", "F_Score", "C_Score", "O_Score", "CFO", "Net_Income"]);
    for p in &report.trend {
        trend.add_row(vec![
            Cell::new(p.year),
            Cell::new(score_2dp(p.f_score)),
            Cell::new(score_2dp(p.c_score)),
            Cell::new(score_2dp(p.o_score)),
            Cell::new(amount(p.cfo)),
            Cell::new(amount(p.net_income)),
        ]);
    }
    out.push_str(&format!("Score Trends / Cash Flow vs Net Income\n{trend}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::acme_dataset;

    fn acme_report() -> CompanyReport {
        build_company_report(&acme_dataset(), "Acme").unwrap()
    }

    #[test]
    fn test_text_report_contents() {
        colored::control::set_override(false);
        let s = format_report(&acme_report());
        assert!(s.contains("Acme (FY 2023)"));
        assert!(s.contains("Piotroski F-Score"));
        assert!(s.contains("3 / 9"));
        assert!(s.contains("Weak"));
        assert!(s.contains("High Risk"));
        assert!(s.contains("At Risk"));
        assert!(s.contains("Overall Interpretation:  High Forensic Risk"));
        assert!(s.contains("0.050"));
        assert!(s.contains("1,000.00"));
        assert!(s.contains("2022"));
    }

    #[test]
    fn test_json_render() {
        let s = render(&acme_report(), ReportFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["latest_year"], 2023);
        assert_eq!(v["scorecards"][1]["label"], "High Risk");
        assert_eq!(v["accrual"]["color"], "#1f7a1f");
    }
}
