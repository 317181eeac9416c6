use std::borrow::Cow;

use async_trait::async_trait;
use sweepsage_core::chat_completion::{Tool, ToolOutput, ToolSpec, errors::ToolError};

use crate::conversation::REPORT_TRIGGER;

/// Marks the conversation as generating a report.
///
/// The tool itself does nothing; the agent switches the conversation to the report prompt once
/// it completed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FillContextForReport;

#[async_trait]
impl Tool for FillContextForReport {
    async fn invoke(&self, _raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(format!("{REPORT_TRIGGER} completed")))
    }

    fn name(&self) -> Cow<'_, str> {
        REPORT_TRIGGER.into()
    }

    fn tool_spec(&self) -> ToolSpec {
        ToolSpec {
            name: REPORT_TRIGGER.to_string(),
            description: "Takes no arguments and returns nothing useful. Call it before writing a \
                          usage report for the user, so the context for report generation is \
                          prepared."
                .to_string(),
            parameters_schema: None,
        }
    }
}
