//! Sheet reader: prints the first two columns of a fixed range. Produces no
//! output file.

use super::{SyncComponent, SyncContext};
use crate::auth::Credentials;
use crate::error::{check_status, payload_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

/// Base URL for Google Sheets API v4
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// First two columns of a spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub first: String,
    pub second: String,
}

impl SheetRow {
    /// Take the first two cells, treating missing ones as empty
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            first: cell(0),
            second: cell(1),
        }
    }
}

impl std::fmt::Display for SheetRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.first, self.second)
    }
}

/// Response of `spreadsheets.values.get`
#[derive(Debug, Deserialize, Default)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Source of cell values
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn get_values(&self, sheet_id: &str, cell_range: &str) -> SyncResult<Vec<Vec<String>>>;
}

/// Google Sheets API client
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, credentials: &Credentials) -> Self {
        Self {
            client,
            access_token: credentials.access_token().to_string(),
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn get_values(&self, sheet_id: &str, cell_range: &str) -> SyncResult<Vec<Vec<String>>> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(sheet_id),
            urlencoding::encode(cell_range)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let range: ValueRange = check_status("Google Sheets", response)
            .await?
            .json()
            .await
            .map_err(|e| payload_error(&format!("Failed to parse sheet values: {}", e)))?;
        Ok(range.values)
    }
}

/// Fetch the range and print each row's first two columns
pub async fn read_sheet(
    source: &dyn SheetSource,
    sheet_id: &str,
    cell_range: &str,
) -> SyncResult<Vec<SheetRow>> {
    let values = source.get_values(sheet_id, cell_range).await?;
    if values.is_empty() {
        info!("No data found in {}", cell_range);
        println!("No data found.");
        return Ok(Vec::new());
    }

    let rows: Vec<SheetRow> = values.iter().map(|cells| SheetRow::from_cells(cells)).collect();
    for row in &rows {
        println!("{}", row);
    }

    info!("Read {} rows from {}", rows.len(), cell_range);
    Ok(rows)
}

/// Sheet component backed by Google Sheets
#[derive(Debug, Default, Clone, Copy)]
pub struct SheetReader;

#[async_trait]
impl SyncComponent for SheetReader {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn run(&self, ctx: &SyncContext) -> SyncResult<()> {
        let client = GoogleSheetsClient::new(ctx.client.clone(), &ctx.credentials);
        let sheets = &ctx.config.sheets;
        read_sheet(&client, &sheets.sheet_id, &sheets.cell_range).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_row_from_short_and_long_rows() {
        let row = SheetRow::from_cells(&["Milk".to_string()]);
        assert_eq!(row.to_string(), "Milk, ");

        let row = SheetRow::from_cells(&[
            "Eggs".to_string(),
            "12".to_string(),
            "ignored".to_string(),
        ]);
        assert_eq!(row.to_string(), "Eggs, 12");
    }

    #[tokio::test]
    async fn test_read_sheet_from_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Chores%21A2%3AB"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Chores!A2:B4",
                "majorDimension": "ROWS",
                "values": [["Dishes", "Ana"], ["Trash"]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GoogleSheetsClient::new(Client::new(), &Credentials::new("test-token"))
            .with_base_url(server.uri());
        let rows = read_sheet(&client, "sheet-1", "Chores!A2:B").await.unwrap();

        assert_eq!(
            rows,
            vec![
                SheetRow {
                    first: "Dishes".to_string(),
                    second: "Ana".to_string()
                },
                SheetRow {
                    first: "Trash".to_string(),
                    second: String::new()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"range": "A1:B2"})))
            .mount(&server)
            .await;

        let client = GoogleSheetsClient::new(Client::new(), &Credentials::new("t"))
            .with_base_url(server.uri());
        assert!(read_sheet(&client, "s", "A1:B2").await.unwrap().is_empty());
    }
}
