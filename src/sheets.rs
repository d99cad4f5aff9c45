use async_trait::async_trait;
use google_sheets4::api::ValueRange;
use google_sheets4::{hyper, hyper_rustls, Sheets};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::transform::{Row, WriteRange};

pub type Hub = Sheets<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>;

/// Values are stored as sent, never parsed as formulas or dates.
pub const VALUE_INPUT_OPTION: &str = "RAW";

/// Request body holding the single bumped cell of `target`.
pub fn cell_payload(target: &WriteRange) -> ValueRange {
    ValueRange {
        major_dimension: None,
        range: None,
        values: Some(vec![vec![Value::from(target.value)]]),
    }
}

/// The two remote calls a run makes. Runs are single-threaded, so futures
/// need not be `Send`.
#[async_trait(?Send)]
pub trait SheetBackend {
    async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>>;

    /// Overwrites one cell with a raw, uninterpreted value.
    async fn write_cell(&self, spreadsheet_id: &str, target: &WriteRange) -> Result<()>;
}

pub struct GoogleSheets {
    hub: Hub,
    scope: String,
}

impl GoogleSheets {
    pub fn new(hub: Hub, scope: impl Into<String>) -> Self {
        Self {
            hub,
            scope: scope.into(),
        }
    }
}

#[async_trait(?Send)]
impl SheetBackend for GoogleSheets {
    async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>> {
        info!("Fetching rows from sheet {} range {}", spreadsheet_id, range);

        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .add_scope(&self.scope)
            .doit()
            .await
            .map_err(|e| Error::Transport(format!("Unable to retrieve data from sheet: {e}")))?;

        let rows = value_range.values.unwrap_or_default();
        debug!("Fetched {} rows", rows.len());
        Ok(rows)
    }

    async fn write_cell(&self, spreadsheet_id: &str, target: &WriteRange) -> Result<()> {
        info!("Writing {} to {}", target.value, target.range);

        self.hub
            .spreadsheets()
            .values_update(cell_payload(target), spreadsheet_id, &target.range)
            .value_input_option(VALUE_INPUT_OPTION)
            .add_scope(&self.scope)
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| Error::Transport(format!("Unable to update {}: {e}", target.range)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_one_numeric_cell() {
        let target = WriteRange {
            range: "Class Data!B2:B2".to_string(),
            row: Some(2),
            value: 10,
        };

        let payload = cell_payload(&target);
        assert_eq!(payload.values, Some(vec![vec![json!(10)]]));
        assert_eq!(payload.range, None);
        assert_eq!(payload.major_dimension, None);
    }

    #[test]
    fn negative_value_stays_a_number() {
        let target = WriteRange {
            range: "S!C1:C1".to_string(),
            row: Some(1),
            value: -4,
        };
        assert_eq!(cell_payload(&target).values, Some(vec![vec![json!(-4)]]));
    }

    #[test]
    fn writes_are_raw() {
        assert_eq!(VALUE_INPUT_OPTION, "RAW");
    }
}
