//! The three prompt files the application needs, loaded once at startup.
use std::path::{Path, PathBuf};

use sweepsage_agents::PromptSet;
use sweepsage_core::prompt::Template;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt path `{0}` is not configured")]
    MissingKey(&'static str),
    #[error("prompt file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read prompt file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rag summarize prompt {path} does not contain the `{placeholder}` placeholder")]
    MissingPlaceholder {
        path: PathBuf,
        placeholder: &'static str,
    },
}

const RAG_PLACEHOLDERS: [&str; 2] = ["input", "context"];

#[derive(Debug, Clone)]
pub struct PromptLibrary {
    main: String,
    rag_summarize: Template,
    report: String,
}

impl PromptLibrary {
    /// Reads the main, rag summarize and report prompts named in the config.
    ///
    /// The rag summarize prompt may use `{input}` style placeholders; they are rewritten into
    /// template variables.
    ///
    /// # Errors
    ///
    /// Fails if a prompt path is not configured, a file is missing or unreadable, or the rag
    /// summarize prompt lacks one of its placeholders.
    pub fn load(config: &Config) -> Result<Self, PromptError> {
        let prompts = &config.prompts;

        let main = read_prompt(
            config,
            prompts.main_prompt_path.as_deref(),
            "main_prompt_path",
        )?;
        let report = read_prompt(
            config,
            prompts.report_prompt_path.as_deref(),
            "report_prompt_path",
        )?;

        let rag_path = prompts
            .rag_summarize_prompt_path
            .as_deref()
            .ok_or(PromptError::MissingKey("rag_summarize_prompt_path"))?;
        let rag_text = read_prompt(config, Some(rag_path), "rag_summarize_prompt_path")?;
        let rag_summarize = Template::with_placeholders(rag_text, &RAG_PLACEHOLDERS);

        if let Some(placeholder) = RAG_PLACEHOLDERS
            .into_iter()
            .find(|name| !rag_summarize.references(name))
        {
            return Err(PromptError::MissingPlaceholder {
                path: config.resolve(rag_path),
                placeholder,
            });
        }

        Ok(Self {
            main,
            rag_summarize,
            report,
        })
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn rag_summarize(&self) -> &Template {
        &self.rag_summarize
    }

    /// The system prompts the agent switches between
    pub fn prompt_set(&self) -> PromptSet {
        PromptSet::new(self.main.clone(), self.report.clone())
    }
}

fn read_prompt(
    config: &Config,
    path: Option<&Path>,
    key: &'static str,
) -> Result<String, PromptError> {
    let path = config.resolve(path.ok_or(PromptError::MissingKey(key))?);

    match fs_err::read_to_string(&path) {
        Ok(content) => {
            tracing::debug!(key, path = %path.display(), "Loaded prompt");
            Ok(content)
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(key, path = %path.display(), "Prompt file not found");
            Err(PromptError::NotFound(path))
        }
        Err(source) => Err(PromptError::Read { path, source }),
    }
}
