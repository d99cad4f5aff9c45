use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    cfg::Cfg,
    error::{Error, Result},
    sheets::SheetBackend,
    transform::{locate_and_increment, Column, WriteRange},
};

/// One read-scan-write cycle against `backend`, bumping the row dated `today`.
pub async fn run_job<B: SheetBackend>(
    cfg: &Cfg,
    column: Column,
    today: NaiveDate,
    backend: &B,
) -> Result<WriteRange> {
    info!("Starting job execution");

    let range = cfg.sheet_read_range();
    let rows = backend.read_rows(&cfg.spreadsheet_id, &range).await?;
    info!("Scanning {} rows from {}", rows.len(), range);

    let target = locate_and_increment(column, &cfg.sheet_name, &rows, today)?;

    // An address without a row number would land on the header cell.
    if target.row.is_none() {
        warn!("No row dated today in {}; computed range {}", range, target.range);
        return Err(Error::Data(format!("no row dated today in {range}, nothing written")));
    }

    backend.write_cell(&cfg.spreadsheet_id, &target).await?;
    info!("Updated {} to {}", target.range, target.value);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Row;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeSheet {
        rows: Vec<Row>,
        fail_read: bool,
        fail_write: bool,
        reads: RefCell<Vec<(String, String)>>,
        writes: RefCell<Vec<(String, WriteRange)>>,
    }

    #[async_trait(?Send)]
    impl SheetBackend for FakeSheet {
        async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>> {
            self.reads
                .borrow_mut()
                .push((spreadsheet_id.to_string(), range.to_string()));
            if self.fail_read {
                return Err(Error::Transport("read refused".into()));
            }
            Ok(self.rows.clone())
        }

        async fn write_cell(&self, spreadsheet_id: &str, target: &WriteRange) -> Result<()> {
            if self.fail_write {
                return Err(Error::Transport("write refused".into()));
            }
            self.writes
                .borrow_mut()
                .push((spreadsheet_id.to_string(), target.clone()));
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn cfg() -> Cfg {
        Cfg {
            spreadsheet_id: "sheet-123".to_string(),
            sheet_name: "Class Data".to_string(),
            ..Cfg::default()
        }
    }

    #[tokio::test]
    async fn reads_then_writes_bumped_cell() {
        let sheet = FakeSheet {
            rows: vec![
                vec![json!("2024/01/01"), json!("5"), json!("6"), json!("x"), json!("")],
                vec![json!("2024/01/02"), json!("9"), json!("3"), json!("y"), json!("")],
            ],
            ..FakeSheet::default()
        };

        let target = run_job(&cfg(), Column::B, today(), &sheet).await.unwrap();

        assert_eq!(target.range, "Class Data!B2:B2");
        assert_eq!(target.value, 10);
        assert_eq!(
            sheet.reads.borrow().as_slice(),
            &[("sheet-123".to_string(), "Class Data!A2:E".to_string())]
        );
        assert_eq!(sheet.writes.borrow().as_slice(), &[("sheet-123".to_string(), target)]);
    }

    #[tokio::test]
    async fn read_failure_skips_write() {
        let sheet = FakeSheet {
            fail_read: true,
            ..FakeSheet::default()
        };

        let err = run_job(&cfg(), Column::C, today(), &sheet).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(sheet.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let sheet = FakeSheet {
            rows: vec![vec![json!("2024/01/02"), json!("1"), json!("2"), json!("y")]],
            fail_write: true,
            ..FakeSheet::default()
        };

        let err = run_job(&cfg(), Column::C, today(), &sheet).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn unmatched_date_writes_nothing() {
        let sheet = FakeSheet {
            rows: vec![vec![json!("2024/01/01"), json!("5"), json!("6"), json!("x")]],
            ..FakeSheet::default()
        };

        let err = run_job(&cfg(), Column::B, today(), &sheet).await.unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        assert!(sheet.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn bad_counter_writes_nothing() {
        let sheet = FakeSheet {
            rows: vec![vec![json!("2024/01/02"), json!("many"), json!("6"), json!("y")]],
            ..FakeSheet::default()
        };

        assert!(run_job(&cfg(), Column::B, today(), &sheet).await.is_err());
        assert!(sheet.writes.borrow().is_empty());
    }
}
