//! Prompt templating
//!
//! Prompts are rendered with [tera], so templates use jinja style `{{ variable }}` substitution.
//! Prompt files written for single brace placeholders (`{input}`) can be brought into that
//! syntax with [`Template::with_placeholders`], which only rewrites the variables it is told
//! about and leaves any other braces in the text alone.
//!
//! # Example
//!
//! ```
//! # use sweepsage_core::prompt::Template;
//! let template = Template::with_placeholders("Question: {input}", &["input"]);
//! let prompt = template.to_prompt().with_context_value("input", "how do I empty the bin?");
//!
//! assert_eq!(prompt.render().unwrap(), "Question: how do I empty the bin?");
//! ```
use std::borrow::Cow;

use anyhow::{Context as _, Result};
use regex::Regex;

/// A prompt template, rendered with tera when context is provided
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template(Cow<'static, str>);

impl Template {
    /// Rewrites `{name}` and `{{name}}` for each of `names` into tera's `{{ name }}`
    pub fn with_placeholders(text: impl Into<String>, names: &[&str]) -> Self {
        let mut text = text.into();
        for name in names {
            let pattern = format!(r"\{{\{{?\s*{}\s*\}}\}}?", regex::escape(name));
            // Escaped names always form a valid pattern
            if let Ok(re) = Regex::new(&pattern) {
                text = re
                    .replace_all(&text, format!("{{{{ {name} }}}}").as_str())
                    .into_owned();
            }
        }
        Template(Cow::Owned(text))
    }

    /// Whether the template substitutes the given variable
    pub fn references(&self, name: &str) -> bool {
        let pattern = format!(r"\{{\{{\s*{}\s*(\|[^}}]*)?\}}\}}", regex::escape(name));
        Regex::new(&pattern).is_ok_and(|re| re.is_match(&self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_prompt(&self) -> Prompt {
        Prompt {
            template: self.clone(),
            context: None,
        }
    }
}

impl From<&'static str> for Template {
    fn from(value: &'static str) -> Self {
        Template(Cow::Borrowed(value))
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Template(Cow::Owned(value))
    }
}

/// A Prompt can be sent to a [`SimplePrompt`][crate::SimplePrompt] after rendering.
#[derive(Clone, Debug)]
pub struct Prompt {
    template: Template,
    context: Option<tera::Context>,
}

impl Prompt {
    /// Adds a key-value pair to the context of the Prompt
    #[must_use]
    pub fn with_context_value(mut self, key: &str, value: impl Into<tera::Value>) -> Self {
        let context = self.context.get_or_insert_with(tera::Context::default);
        context.insert(key, &value.into());
        self
    }

    /// Renders a prompt
    ///
    /// If no context is provided, the template is returned as is.
    ///
    /// # Errors
    ///
    /// Fails if the template is invalid or references a variable missing from the context.
    pub fn render(&self) -> Result<String> {
        let Some(context) = &self.context else {
            return Ok(self.template.as_str().to_string());
        };

        tera::Tera::one_off(self.template.as_str(), context, false)
            .context("Failed to render prompt template")
    }
}

impl From<&'static str> for Prompt {
    fn from(prompt: &'static str) -> Self {
        Template::from(prompt).to_prompt()
    }
}

impl From<String> for Prompt {
    fn from(prompt: String) -> Self {
        Template::from(prompt).to_prompt()
    }
}

impl From<&Template> for Prompt {
    fn from(template: &Template) -> Self {
        template.to_prompt()
    }
}
