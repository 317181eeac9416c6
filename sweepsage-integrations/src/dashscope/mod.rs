//! Alibaba Cloud DashScope, through its OpenAI compatible mode.
//!
//! The api key is read from the `DASHSCOPE_API_KEY` environment variable unless configured
//! explicitly.
//!
//! # Example
//!
//! ```no_run
//! # use sweepsage_integrations::dashscope::Dashscope;
//! let dashscope = Dashscope::builder()
//!     .default_prompt_model("qwen3-max")
//!     .default_embed_model("text-embedding-v4")
//!     .build()
//!     .unwrap();
//! ```
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};

use crate::openai;

pub const DASHSCOPE_API_BASE: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DASHSCOPE_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

pub type Dashscope = openai::GenericOpenAI<DashscopeConfig>;
pub type DashscopeBuilder = openai::GenericOpenAIBuilder<DashscopeConfig>;

impl Dashscope {
    pub fn builder() -> DashscopeBuilder {
        DashscopeBuilder::default()
    }
}

#[derive(Clone, Debug)]
pub struct DashscopeConfig {
    api_base: String,
    api_key: SecretString,
}

impl Default for DashscopeConfig {
    fn default() -> Self {
        Self {
            api_base: DASHSCOPE_API_BASE.to_string(),
            api_key: api_key_from_env(),
        }
    }
}

fn api_key_from_env() -> SecretString {
    SecretString::from(std::env::var(DASHSCOPE_API_KEY_ENV).unwrap_or_default())
}

impl DashscopeConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Custom api base with the api key from the environment
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key_from_env(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

impl async_openai::config::Config for DashscopeConfig {
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", self.api_key.expose_secret());
        match HeaderValue::from_str(&bearer) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Dashscope api key is not a valid header value"),
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim_end_matches('/'))
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    fn query(&self) -> Vec<(&str, &str)> {
        vec![]
    }
}
