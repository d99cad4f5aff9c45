use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Date format of the first column, e.g. `2024/01/02`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Rows shorter than this carry no counter cells and are skipped.
const MIN_ROW_LEN: usize = 3;

/// One fetched sheet row starting at column A: date in A, counters in B and C.
pub type Row = Vec<Value>;

/// Counter column a run is allowed to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    B,
    C,
}

impl Column {
    /// Zero-based offset of the column inside a fetched row.
    pub fn offset(self) -> usize {
        match self {
            Column::B => 1,
            Column::C => 2,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Column::B => "B",
            Column::C => "C",
        }
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "B" => Ok(Column::B),
            "C" => Ok(Column::C),
            other => Err(Error::Config(format!("invalid column: {other}"))),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// A single-cell target (`Sheet!C5:C5`) and the value to put there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRange {
    pub range: String,
    /// 1-based position in the fetched grid, `None` when no row matched.
    pub row: Option<usize>,
    pub value: i64,
}

impl WriteRange {
    fn new(sheet_name: &str, column: Column, row: Option<usize>, value: i64) -> Self {
        let col = column.letter();
        let row_num = row.map(|r| r.to_string()).unwrap_or_default();
        Self {
            range: format!("{sheet_name}!{col}{row_num}:{col}{row_num}"),
            row,
            value,
        }
    }
}

pub fn increment(n: i64) -> i64 {
    n.wrapping_add(1)
}

/// Scans every row without stopping at the first hit, so the last row dated
/// `today` wins. With no match the returned range has an empty row number and
/// a zero value.
pub fn locate_and_increment(
    column: Column,
    sheet_name: &str,
    rows: &[Row],
    today: NaiveDate,
) -> Result<WriteRange> {
    let today = today.format(DATE_FORMAT).to_string();
    let mut row_num = None;
    let mut new_val = 0;

    if rows.is_empty() {
        warn!("No data found.");
    }

    for (i, row) in rows.iter().enumerate() {
        if row.len() < MIN_ROW_LEN {
            warn!("length is less than {}. row: {}, length: {}", MIN_ROW_LEN, i + 1, row.len());
            continue;
        }

        if row[0].as_str() != Some(today.as_str()) {
            continue;
        }

        let current = parse_counter(&row[column.offset()], i + 1, column)?;
        new_val = increment(current);
        row_num = Some(i + 1);
        debug!("Row {} matches {}: {} -> {}", i + 1, today, current, new_val);
    }

    Ok(WriteRange::new(sheet_name, column, row_num, new_val))
}

fn parse_counter(cell: &Value, row: usize, column: Column) -> Result<i64> {
    let text = cell.as_str().ok_or_else(|| {
        Error::Data(format!("row {row} column {column}: expected text, got {cell}"))
    })?;
    text.parse::<i64>()
        .map_err(|e| Error::Data(format!("row {row} column {column}: {text:?}: {e}")))
}
