use std::path::Path;

use crate::error::{ForensicError, Result};
use crate::models::{AccrualZone, Dataset, FinancialRecord};

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

pub const COL_COMPANY: &str = "Company";
pub const COL_YEAR: &str = "Year";
pub const COL_F_SCORE: &str = "F_Score";
pub const COL_C_SCORE: &str = "C_Score";
pub const COL_O_SCORE: &str = "O_SCORE";
pub const COL_CFO: &str = "CFO";
pub const COL_NET_INCOME: &str = "Net_Income";
pub const COL_CF_ACCRUAL: &str = "CF_Accrual_Ratio";
pub const COL_BS_ACCRUAL: &str = "BS_Accrual_Ratio";
pub const COL_ZONE: &str = "Accrual_Zone";
pub const COL_INTERPRETATION: &str = "Accrual_Interpretation";

pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_COMPANY,
    COL_YEAR,
    COL_F_SCORE,
    COL_C_SCORE,
    COL_O_SCORE,
    COL_CFO,
    COL_NET_INCOME,
    COL_CF_ACCRUAL,
    COL_BS_ACCRUAL,
    COL_ZONE,
    COL_INTERPRETATION,
];

/// Format-neutral cell, produced by both the CSV and the workbook readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Empty => return None,
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    fn as_year(&self) -> Option<i32> {
        if let Self::Text(s) = self {
            if let Ok(y) = s.trim().parse::<i32>() {
                return Some(y);
            }
        }
        let v = self.as_f64()?;
        if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
            return None;
        }
        Some(v as i32)
    }
}

// ---------------------------------------------------------------------------
// Header resolution + typed row parsing
// ---------------------------------------------------------------------------

struct ColumnMap {
    company: usize,
    year: usize,
    f_score: usize,
    c_score: usize,
    o_score: usize,
    cfo: usize,
    net_income: usize,
    cf_accrual: usize,
    bs_accrual: usize,
    zone: usize,
    interpretation: usize,
}

impl ColumnMap {
    /// Exact, case-sensitive header match. All absent columns are reported at once.
    fn resolve(header: &[Cell]) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|c| c.display().trim().to_string()).collect();
        let find = |col: &str| names.iter().position(|n| n == col);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ForensicError::MissingColumns(missing));
        }

        let idx = |col: &str| find(col).unwrap_or_default();
        Ok(Self {
            company: idx(COL_COMPANY),
            year: idx(COL_YEAR),
            f_score: idx(COL_F_SCORE),
            c_score: idx(COL_C_SCORE),
            o_score: idx(COL_O_SCORE),
            cfo: idx(COL_CFO),
            net_income: idx(COL_NET_INCOME),
            cf_accrual: idx(COL_CF_ACCRUAL),
            bs_accrual: idx(COL_BS_ACCRUAL),
            zone: idx(COL_ZONE),
            interpretation: idx(COL_INTERPRETATION),
        })
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

struct RowReader<'a> {
    cells: &'a [Cell],
    row: usize,
}

impl RowReader<'_> {
    fn cell(&self, idx: usize) -> &Cell {
        self.cells.get(idx).unwrap_or(&EMPTY_CELL)
    }

    fn invalid(&self, idx: usize, column: &str) -> ForensicError {
        ForensicError::InvalidValue {
            row: self.row,
            column: column.to_string(),
            value: self.cell(idx).display(),
        }
    }

    fn number(&self, idx: usize, column: &str) -> Result<f64> {
        self.cell(idx).as_f64().ok_or_else(|| self.invalid(idx, column))
    }

    fn year(&self, idx: usize) -> Result<i32> {
        self.cell(idx).as_year().ok_or_else(|| self.invalid(idx, COL_YEAR))
    }

    fn text(&self, idx: usize) -> String {
        self.cell(idx).display()
    }

    fn required_text(&self, idx: usize, column: &str) -> Result<String> {
        let s = self.text(idx);
        if s.trim().is_empty() {
            return Err(self.invalid(idx, column));
        }
        Ok(s)
    }
}

/// Turn a header row plus data rows into typed records. Row numbers in errors
/// are 1-based with the header as row 1.
pub fn parse_rows(rows: Vec<Vec<Cell>>) -> Result<Vec<FinancialRecord>> {
    let mut iter = rows.into_iter();
    let header = iter.next().unwrap_or_default();
    let cols = ColumnMap::resolve(&header)?;

    let mut records = Vec::new();
    for (i, cells) in iter.enumerate() {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        let r = RowReader {
            cells: &cells,
            row: i + 2,
        };
        records.push(FinancialRecord {
            company: r.required_text(cols.company, COL_COMPANY)?.trim().to_string(),
            year: r.year(cols.year)?,
            f_score: r.number(cols.f_score, COL_F_SCORE)?,
            c_score: r.number(cols.c_score, COL_C_SCORE)?,
            o_score: r.number(cols.o_score, COL_O_SCORE)?,
            cfo: r.number(cols.cfo, COL_CFO)?,
            net_income: r.number(cols.net_income, COL_NET_INCOME)?,
            cf_accrual_ratio: r.number(cols.cf_accrual, COL_CF_ACCRUAL)?,
            bs_accrual_ratio: r.number(cols.bs_accrual, COL_BS_ACCRUAL)?,
            accrual_zone: AccrualZone::parse(&r.required_text(cols.zone, COL_ZONE)?),
            accrual_interpretation: r.text(cols.interpretation),
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// File readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Csv,
    Workbook,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(ForensicError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn read_csv(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(feature = "xlsx")]
pub(crate) fn cell_from_data(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(s) => names
            .iter()
            .find(|n| n.as_str() == s)
            .cloned()
            .ok_or_else(|| ForensicError::MissingSheet(s.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ForensicError::MissingSheet("(workbook has no sheets)".to_string()))?,
    };
    tracing::debug!(sheet = %name, "reading worksheet");
    let range = workbook.worksheet_range(&name)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(path: &Path, _sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    Err(ForensicError::UnsupportedFormat(format!(
        "{} (workbook support requires the 'xlsx' feature)",
        path.display()
    )))
}

/// Load and validate a dataset. `sheet` only applies to workbooks.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let kind = SourceKind::detect(path)?;
    let rows = match kind {
        SourceKind::Csv => read_csv(path)?,
        SourceKind::Workbook => read_workbook(path, sheet)?,
    };
    let records = parse_rows(rows)?;
    let dataset = Dataset {
        source: path.to_path_buf(),
        records,
    };
    tracing::info!(
        path = %path.display(),
        records = dataset.records.len(),
        companies = dataset.companies().len(),
        "loaded dataset"
    );
    Ok(dataset)
}
