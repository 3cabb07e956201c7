use super::load_with_settings;
use crate::error::Result;

pub fn run(file: &str, sheet: Option<&str>) -> Result<()> {
    let dataset = load_with_settings(file, sheet)?;
    let companies = dataset.companies();

    println!("File:       {}", dataset.source.display());
    println!("Records:    {}", dataset.records.len());
    println!("Companies:  {}", companies.len());
    if let (Some(min), Some(max)) = (
        dataset.records.iter().map(|r| r.year).min(),
        dataset.records.iter().map(|r| r.year).max(),
    ) {
        println!("Years:      {min}\u{2013}{max}");
    }
    if dataset.is_empty() {
        println!();
        println!("No data rows. Add at least one company-year row to view a report.");
    } else {
        println!();
        println!("OK");
    }
    Ok(())
}
