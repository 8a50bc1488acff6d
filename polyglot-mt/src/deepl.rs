//! DeepL API provider for machine translation
//!
//! This module integrates with the DeepL v2 REST API to provide real
//! machine translation.
//!
//! # Authentication
//!
//! The key travels in the `Authorization: DeepL-Auth-Key <key>` header and is
//! taken from a [`DeepLConfig`], usually loaded from `DEEPL_API_KEY`.
//!
//! # Example
//!
//! ```ignore
//! use polyglot_mt::{DeepLConfig, DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::new(DeepLConfig::from_env()?)?;
//!     let result = provider.translate("Hello, world!", Some("EN"), "DE").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::config::DeepLConfig;
use crate::error::{MtError, MtResult};
use crate::translator::{
    MachineTranslator, normalize_source_lang, normalize_target_lang, validate_lang_code,
};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    detected_source_language: Option<String>,
    text: String,
}

/// DeepL API v2 provider
///
/// Sends one text per request; request batching is left to callers.
#[derive(Clone)]
pub struct DeepLProvider {
    config: DeepLConfig,
    /// HTTP client for async requests
    client: reqwest::Client,
}

impl DeepLProvider {
    /// Maximum request payload accepted by the API (128 KiB)
    const MAX_TEXT_BYTES: usize = 128 * 1024;

    /// Create a new provider from an explicit configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the API key is empty or HTTP client creation fails
    pub fn new(config: DeepLConfig) -> MtResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a provider from `DEEPL_API_KEY` and friends
    pub fn from_env() -> MtResult<Self> {
        Self::new(DeepLConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/translate", self.config.resolved_base_url())
    }
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("api_key", &"***")
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLProvider {
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> MtResult<String> {
        validate_lang_code(target_lang)?;
        if let Some(source) = source_lang {
            validate_lang_code(source)?;
        }

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.len() > Self::MAX_TEXT_BYTES {
            return Err(MtError::Other(format!(
                "Text exceeds maximum length of {} bytes",
                Self::MAX_TEXT_BYTES
            )));
        }

        let mut body = json!({
            "text": [text],
            "target_lang": normalize_target_lang(target_lang),
        });
        if let Some(source) = source_lang {
            body["source_lang"] = json!(normalize_source_lang(source));
        }

        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MtError::provider(Some(status.as_u16()), error_text));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            MtError::provider(
                Some(status.as_u16()),
                format!("Failed to parse API response: {}", e),
            )
        })?;

        let translation = parsed.translations.into_iter().next().ok_or_else(|| {
            MtError::provider(
                Some(status.as_u16()),
                "Invalid API response: empty 'translations' array",
            )
        })?;

        debug!(
            detected_source = translation.detected_source_language.as_deref(),
            "DeepL translation received"
        );

        Ok(translation.text)
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
