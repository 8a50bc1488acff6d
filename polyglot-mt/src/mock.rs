//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the translation pipeline without requiring API keys or network access.
//!
//! # Example
//!
//! ```ignore
//! use polyglot_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", None, "FR").await.unwrap();
//!     assert_eq!(result, "hello_FR");
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target language suffix: "hello" → "hello_FR"
    /// This preserves marker tokens perfectly for testing
    Suffix,

    /// Upper-case the whole input
    Uppercase,

    /// Use predefined mappings for realistic translations
    /// (text, target_lang) → translation, falling back to Suffix behavior
    Mappings(HashMap<(String, String), String>),

    /// Simulate word reordering by reversing whitespace-separated words
    Reorder,

    /// Fail every call with the given error
    Error(MtError),

    /// Fail only for the listed inputs, behave like Suffix otherwise
    FailOn(HashSet<String>),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the call counter, so a test can hand a clone to the
/// code under test and still inspect how many calls reached the provider.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Number of `translate` calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Uppercase => Ok(text.to_uppercase()),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().collect();
                Ok(words.into_iter().rev().collect::<Vec<_>>().join(" "))
            }
            MockMode::Error(err) => Err(err.clone()),
            MockMode::FailOn(inputs) => {
                if inputs.contains(text) {
                    Err(MtError::provider(Some(500), format!("mock failure for '{}'", text)))
                } else {
                    Ok(format!("{}_{}", text, target))
                }
            }
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_lang: Option<&str>,
        target_lang: &str,
    ) -> MtResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.apply_translation(text, target_lang)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
