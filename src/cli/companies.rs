use colored::Colorize;
use comfy_table::{Cell, Table};

use super::load_with_settings;
use crate::error::Result;
use crate::interpret::Tone;
use crate::reports::{company_overview, CompanyRow};

pub fn run(file: &str, sheet: Option<&str>) -> Result<()> {
    let dataset = load_with_settings(file, sheet)?;
    let rows = company_overview(&dataset)?;
    println!("{}", format_companies(&rows));
    Ok(())
}

pub fn format_companies(rows: &[CompanyRow]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Company", "Years", "Records", "Latest Verdict"]);
    for row in rows {
        let verdict = row.verdict.as_str();
        let verdict = match row.tone {
            Tone::Green => verdict.green(),
            Tone::Amber => verdict.yellow(),
            Tone::Blue => verdict.blue(),
            Tone::Red => verdict.red(),
        };
        table.add_row(vec![
            Cell::new(&row.company),
            Cell::new(format!("{}\u{2013}{}", row.first_year, row.latest_year)),
            Cell::new(row.records),
            Cell::new(verdict.bold()),
        ]);
    }
    format!("Companies ({})\n{table}", rows.len())
}
