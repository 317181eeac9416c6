//! Usage records from an external system, loaded once from a csv export
use std::{
    borrow::Cow,
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize, Serializer};
use sweepsage_core::chat_completion::{Tool, ToolOutput, ToolSpec, errors::ToolError};
use thiserror::Error;

use super::parse_args;

/// Column holding the user id
pub const USER_ID_COLUMN: &str = "用户ID";
/// Column holding the month, as `YYYY-MM`
pub const MONTH_COLUMN: &str = "时间";

#[derive(Error, Debug)]
pub enum ExternalDataError {
    #[error("external data file not found: {0}")]
    NotFound(PathBuf),
    #[error("external data is missing the `{0}` column")]
    MissingColumn(&'static str),
    #[error("failed to read external data: {0}")]
    Csv(#[from] csv::Error),
}

/// One csv row, with its columns in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    fields: Vec<(String, String)>,
}

impl UsageRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for UsageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(k, v)| (k, v)))
    }
}

/// Usage records by user id and month.
///
/// Built once, then shared read-only by every conversation.
#[derive(Debug, Clone, Default)]
pub struct ExternalDataCache {
    records: HashMap<String, HashMap<String, UsageRecord>>,
}

impl ExternalDataCache {
    /// Loads all records from a csv file with a header row
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist, cannot be parsed, or lacks the user id or month column.
    pub fn load(path: &Path) -> Result<Self, ExternalDataError> {
        if !path.is_file() {
            return Err(ExternalDataError::NotFound(path.to_path_buf()));
        }
        let cache = Self::from_reader(csv::Reader::from_path(path)?)?;
        tracing::info!(
            path = %path.display(),
            users = cache.records.len(),
            "Loaded external data"
        );
        Ok(cache)
    }

    /// Builds the cache from any csv reader. Later rows win over earlier rows for the same user
    /// and month.
    ///
    /// # Errors
    ///
    /// Fails on malformed csv or a missing user id or month column.
    pub fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
    ) -> Result<Self, ExternalDataError> {
        let headers = reader.headers()?.clone();
        let position = |column: &'static str| {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or(ExternalDataError::MissingColumn(column))
        };
        let user_idx = position(USER_ID_COLUMN)?;
        let month_idx = position(MONTH_COLUMN)?;

        let mut records: HashMap<String, HashMap<String, UsageRecord>> = HashMap::new();
        for row in reader.records() {
            let row = row?;
            let user = row.get(user_idx).unwrap_or_default().trim().to_string();
            let month = row.get(month_idx).unwrap_or_default().trim().to_string();
            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.trim().to_string(), value.to_string()))
                .collect();

            records
                .entry(user)
                .or_default()
                .insert(month, UsageRecord { fields });
        }

        Ok(Self { records })
    }

    pub fn get(&self, user_id: &str, month: &str) -> Option<&UsageRecord> {
        self.records.get(user_id)?.get(month)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FetchExternalDataArgs {
    /// The user's id
    user_id: String,
    /// The month, formatted as YYYY-MM
    month: String,
}

/// Looks up a user's robot usage record for a month
#[derive(Clone, Debug)]
pub struct FetchExternalData {
    cache: Arc<ExternalDataCache>,
}

impl FetchExternalData {
    pub fn new(cache: Arc<ExternalDataCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Tool for FetchExternalData {
    async fn invoke(&self, raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        let FetchExternalDataArgs { user_id, month } = parse_args(raw_args)?;

        let Some(record) = self.cache.get(&user_id, &month) else {
            tracing::warn!(%user_id, %month, "No usage record found");
            return Ok(ToolOutput::text(""));
        };

        let json = serde_json::to_string_pretty(record).map_err(ToolError::failed)?;
        Ok(ToolOutput::text(json))
    }

    fn name(&self) -> Cow<'_, str> {
        "fetch_external_data".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        ToolSpec {
            name: "fetch_external_data".to_string(),
            description: "Fetches a user's robot vacuum and mop robot usage record for a month \
                          from the external system, returned as a string. Returns an empty \
                          string if there is no record."
                .to_string(),
            parameters_schema: Some(schema_for!(FetchExternalDataArgs)),
        }
    }
}
