//! Batch translation of localization catalogs
//!
//! Every untranslated entry of a catalog is run through the
//! [`PlaceholderTranslator`]; entries that already carry a translation are
//! left alone, so running the batch again over its own output is a no-op.
//! A failing entry never aborts the batch: its error is recorded in the
//! [`BatchReport`] and the remaining entries are still translated.

use crate::catalog::{CatalogEntry, CatalogStore, PoCatalog};
use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, PlaceholderTranslator};
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{info, warn};

/// Knobs for a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of provider calls in flight; 1 translates sequentially
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl BatchOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// What happened to one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Newly translated; holds the stored translation
    Translated(String),
    /// Already had a translation
    Skipped,
    /// Translation or storing failed; the entry is left untranslated
    Failed(MtError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub index: usize,
    pub key: String,
    pub status: EntryStatus,
}

/// Per-entry outcomes of a batch run, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchReport {
    pub fn translated(&self) -> usize {
        self.count(|status| matches!(status, EntryStatus::Translated(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, EntryStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, EntryStatus::Failed(_)))
    }

    /// Entries that could not be translated, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &MtError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            EntryStatus::Failed(err) => Some((outcome.key.as_str(), err)),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&EntryStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}

/// Translate every untranslated entry of `store` into `target_lang`
///
/// Never fails as a whole; per-entry failures end up in the report.
pub async fn translate_catalog<T, S>(
    translator: &PlaceholderTranslator<T>,
    store: &mut S,
    target_lang: &str,
    source_lang: Option<&str>,
    options: &BatchOptions,
) -> BatchReport
where
    T: MachineTranslator,
    S: CatalogStore,
{
    let (done, pending): (Vec<CatalogEntry>, Vec<CatalogEntry>) = store
        .entries()
        .into_iter()
        .partition(CatalogEntry::is_translated);

    info!(
        provider = translator.provider().provider_name(),
        target = target_lang,
        pending = pending.len(),
        already_translated = done.len(),
        "starting batch translation"
    );

    let mut outcomes: Vec<EntryOutcome> = done
        .into_iter()
        .map(|entry| EntryOutcome {
            index: entry.index,
            key: entry.key,
            status: EntryStatus::Skipped,
        })
        .collect();

    let results: Vec<(CatalogEntry, MtResult<String>)> = stream::iter(pending)
        .map(|entry| async move {
            let result = translator
                .translate(&entry.key, target_lang, source_lang)
                .await;
            (entry, result)
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    for (entry, result) in results {
        let stored = result
            .and_then(|translation| {
                // An empty msgstr reads as untranslated
                if translation.is_empty() {
                    Err(MtError::provider(None, "provider returned an empty translation"))
                } else {
                    Ok(translation)
                }
            })
            .and_then(|translation| {
                store
                    .set_translation(entry.index, translation.clone())
                    .map(|_| translation)
            });
        let status = match stored {
            Ok(translation) => {
                info!("Translated: {} -> {}", entry.key, translation);
                EntryStatus::Translated(translation)
            }
            Err(err) => {
                warn!("Failed to translate {}: {}", entry.key, err);
                EntryStatus::Failed(err)
            }
        };
        outcomes.push(EntryOutcome {
            index: entry.index,
            key: entry.key,
            status,
        });
    }

    outcomes.sort_by_key(|outcome| outcome.index);
    let report = BatchReport { outcomes };
    info!(
        translated = report.translated(),
        skipped = report.skipped(),
        failed = report.failed(),
        "batch translation finished"
    );
    report
}

/// Translate a PO file and save the result to `output`
///
/// Entries that failed stay untranslated in the output; only loading and
/// saving the file can fail the call.
pub async fn translate_po_file<T: MachineTranslator>(
    translator: &PlaceholderTranslator<T>,
    input: &Path,
    output: &Path,
    target_lang: &str,
    source_lang: Option<&str>,
    options: &BatchOptions,
) -> MtResult<BatchReport> {
    let mut catalog = PoCatalog::load(input)?;
    let report =
        translate_catalog(translator, &mut catalog, target_lang, source_lang, options).await;
    catalog.save(output)?;
    info!(
        "Translation complete. Translated file saved to {}",
        output.display()
    );
    Ok(report)
}
