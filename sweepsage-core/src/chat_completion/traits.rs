use async_trait::async_trait;
use dyn_clone::DynClone;
use std::borrow::Cow;

use super::{
    ToolOutput, ToolSpec,
    chat_completion_request::ChatCompletionRequest,
    chat_completion_response::ChatCompletionResponse,
    errors::{LanguageModelError, ToolError},
};

#[async_trait]
pub trait ChatCompletion: Send + Sync + DynClone {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError>;
}

#[async_trait]
impl ChatCompletion for Box<dyn ChatCompletion> {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        (**self).complete(request).await
    }
}

dyn_clone::clone_trait_object!(ChatCompletion);

/// The `Tool` trait is the interface for agent tools.
///
/// The `ToolSpec` is what will end up with the LLM. The `name` is expected to be unique, and is
/// used to identify the tool. It should be the same as the name in the `ToolSpec`.
#[async_trait]
pub trait Tool: Send + Sync + DynClone {
    async fn invoke(&self, raw_args: Option<&str>) -> Result<ToolOutput, ToolError>;

    fn name(&self) -> Cow<'_, str>;

    fn tool_spec(&self) -> ToolSpec;

    fn boxed<'a>(self) -> Box<dyn Tool + 'a>
    where
        Self: Sized + 'a,
    {
        Box::new(self) as Box<dyn Tool>
    }
}

#[async_trait]
impl Tool for Box<dyn Tool> {
    async fn invoke(&self, raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        (**self).invoke(raw_args).await
    }
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
    fn tool_spec(&self) -> ToolSpec {
        (**self).tool_spec()
    }
}

dyn_clone::clone_trait_object!(Tool);
