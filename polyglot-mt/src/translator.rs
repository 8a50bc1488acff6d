//! Machine Translation trait and the placeholder-preserving translator
//!
//! `MachineTranslator` abstracts the raw provider call (DeepL, mock, ...).
//! `PlaceholderTranslator` wraps any provider and takes care of masking
//! `%(name)s` placeholders before the call and restoring them afterwards.
//!
//! # Example
//!
//! ```ignore
//! use polyglot_mt::{DeepLConfig, DeepLProvider, PlaceholderTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::new(DeepLConfig::from_env()?)?;
//!     let translator = PlaceholderTranslator::new(provider);
//!
//!     let result = translator
//!         .translate("Hello %(name)s!", "DE", Some("EN"))
//!         .await?;
//!     println!("{}", result); // "Hallo %(name)s!"
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::placeholder::{MarkerPolicy, mask};
use async_trait::async_trait;
use tracing::debug;

/// Generic trait for machine translation providers
///
/// Implementations do the raw translation work, either through an API
/// (DeepL) or deterministic logic (Mock). They see text with placeholders
/// already masked and are expected to leave marker tokens alone.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string into `target_lang`
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_lang` - Source language code, or `None` to let the provider detect it
    /// * `target_lang` - Target language code (e.g., "DE", "PT-BR")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError::Provider)` - If the provider rejects the request or cannot be reached
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider, for logging
    fn provider_name(&self) -> &str;
}

/// Translator that keeps `%(name)s` placeholders intact across a provider call
#[derive(Debug, Clone)]
pub struct PlaceholderTranslator<T> {
    provider: T,
    policy: MarkerPolicy,
}

impl<T: MachineTranslator> PlaceholderTranslator<T> {
    /// Create a translator with the lenient marker policy
    pub fn new(provider: T) -> Self {
        Self {
            provider,
            policy: MarkerPolicy::default(),
        }
    }

    /// Choose what happens when the provider drops marker tokens
    pub fn with_policy(mut self, policy: MarkerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MarkerPolicy {
        self.policy
    }

    pub fn provider(&self) -> &T {
        &self.provider
    }

    /// Translate `text` into `target_lang`, preserving every placeholder occurrence
    ///
    /// Provider errors are returned unchanged; no partial result is produced.
    pub async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> MtResult<String> {
        validate_lang_code(target_lang)?;
        if let Some(source) = source_lang {
            validate_lang_code(source)?;
        }

        let masked = mask(text);
        let translated = self
            .provider
            .translate(&masked.text, source_lang, target_lang)
            .await?;
        debug!(
            provider = self.provider.provider_name(),
            masked = %masked.text,
            translated = %translated,
            "provider returned translation"
        );

        let restored = masked.restore(&translated, self.policy)?;
        Ok(restored.text)
    }
}

/// Upper-case a target language code, keeping any region (`pt-br` → `PT-BR`)
pub fn normalize_target_lang(code: &str) -> String {
    code.replace('_', "-").to_uppercase()
}

/// Upper-case a source language code and strip the region (`en-US` → `EN`)
///
/// Source languages are accepted without regional variants.
pub fn normalize_source_lang(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_uppercase()
}

/// Validate that a language code is in acceptable format
///
/// Checks that the code is non-empty and contains only alphanumeric
/// characters, hyphens, and underscores.
pub fn validate_lang_code(code: &str) -> MtResult<()> {
    if code.is_empty() {
        return Err(MtError::InvalidLocale(
            "Language code is empty".to_string(),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in language code: {}",
            code
        )));
    }

    Ok(())
}
