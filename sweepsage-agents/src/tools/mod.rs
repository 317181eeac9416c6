//! Tools the support agent can call.
//!
//! Every tool has a fixed name, a description for the model and, where it takes arguments, a json
//! schema derived from its argument struct.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use sweepsage_core::chat_completion::{Tool, errors::ToolError};
use sweepsage_query::RagService;

mod external_data;
mod rag_summarize;
mod report;
mod user;
mod weather;

pub use external_data::{ExternalDataCache, ExternalDataError, FetchExternalData, UsageRecord};
pub use rag_summarize::RagSummarize;
pub use report::FillContextForReport;
pub use user::{GetCurrentMonth, GetUserId, GetUserLocation};
pub use weather::GetWeather;

/// The full tool set of the support agent
pub fn support_tools(
    rag: Arc<RagService>,
    external_data: Arc<ExternalDataCache>,
) -> Vec<Box<dyn Tool>> {
    vec![
        RagSummarize::new(rag).boxed(),
        GetWeather.boxed(),
        GetUserLocation.boxed(),
        GetUserId.boxed(),
        GetCurrentMonth.boxed(),
        FetchExternalData::new(external_data).boxed(),
        FillContextForReport.boxed(),
    ]
}

pub(crate) fn parse_args<T: DeserializeOwned>(raw_args: Option<&str>) -> Result<T, ToolError> {
    let raw_args = raw_args.ok_or(ToolError::MissingArguments)?;
    Ok(serde_json::from_str(raw_args)?)
}
