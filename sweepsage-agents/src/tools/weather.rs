use std::borrow::Cow;

use async_trait::async_trait;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use sweepsage_core::chat_completion::{Tool, ToolOutput, ToolSpec, errors::ToolError};

use super::parse_args;

#[derive(Debug, Deserialize, JsonSchema)]
struct WeatherArgs {
    /// Name of the city
    city: String,
}

/// Current weather for a city. Always fair weather; there is no weather service behind it.
#[derive(Clone, Copy, Debug, Default)]
pub struct GetWeather;

#[async_trait]
impl Tool for GetWeather {
    async fn invoke(&self, raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        let WeatherArgs { city } = parse_args(raw_args)?;

        Ok(ToolOutput::text(format!(
            "The weather in {city} is sunny, 26°C, 50% humidity, light southerly wind, AQI 21, \
             very low chance of rain in the next 6 hours"
        )))
    }

    fn name(&self) -> Cow<'_, str> {
        "get_weather".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_weather".to_string(),
            description: "Gets the weather for a city, returned as a string".to_string(),
            parameters_schema: Some(schema_for!(WeatherArgs)),
        }
    }
}
