//! Stand-ins for user facts the agent would get from an account system
use std::borrow::Cow;

use async_trait::async_trait;
use rand::seq::SliceRandom as _;
use sweepsage_core::chat_completion::{Tool, ToolOutput, ToolSpec, errors::ToolError};

const CITIES: [&str; 10] = [
    "Beijing", "Shanghai", "Guangzhou", "Shenzhen", "Chengdu", "Chongqing", "Hangzhou", "Nanjing",
    "Wuhan", "Tianjin",
];

const USER_IDS: [&str; 10] = [
    "1001", "1002", "1003", "1004", "1005", "1006", "1007", "1008", "1009", "1010",
];

const MONTHS: [&str; 12] = [
    "2025-01", "2025-02", "2025-03", "2025-04", "2025-05", "2025-06", "2025-07", "2025-08",
    "2025-09", "2025-10", "2025-11", "2025-12",
];

fn pick(options: &[&str]) -> String {
    options
        .choose(&mut rand::thread_rng())
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn no_args_spec(name: &str, description: &str) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters_schema: None,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GetUserLocation;

#[async_trait]
impl Tool for GetUserLocation {
    async fn invoke(&self, _raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(pick(&CITIES)))
    }

    fn name(&self) -> Cow<'_, str> {
        "get_user_location".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        no_args_spec(
            "get_user_location",
            "Gets the name of the city the user is in, returned as a string",
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GetUserId;

#[async_trait]
impl Tool for GetUserId {
    async fn invoke(&self, _raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(pick(&USER_IDS)))
    }

    fn name(&self) -> Cow<'_, str> {
        "get_user_id".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        no_args_spec("get_user_id", "Gets the user's unique id, returned as a string")
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GetCurrentMonth;

#[async_trait]
impl Tool for GetCurrentMonth {
    async fn invoke(&self, _raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(pick(&MONTHS)))
    }

    fn name(&self) -> Cow<'_, str> {
        "get_current_month".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        no_args_spec(
            "get_current_month",
            "Gets the current month as YYYY-MM, returned as a string",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_come_from_fixed_lists() {
        for _ in 0..20 {
            let city = GetUserLocation.invoke(None).await.unwrap();
            assert!(CITIES.contains(&city.content()));

            let id = GetUserId.invoke(Some("{}")).await.unwrap();
            assert!(USER_IDS.contains(&id.content()));

            let month = GetCurrentMonth.invoke(None).await.unwrap();
            assert!(MONTHS.contains(&month.content()));
        }
    }
}
