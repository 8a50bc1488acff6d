//! Localization catalogs that the batch translator reads and updates
//!
//! The batch translator only needs two things from a catalog: the list of
//! entries with their current translations, and a way to set the translation
//! of one entry. `CatalogStore` captures exactly that. `PoCatalog` backs it
//! with a gettext PO file, `MemoryCatalog` with a plain vector.

use crate::error::{MtError, MtResult};
use crate::po_text::PoText;
use polib::catalog::Catalog;
use polib::message::{MessageMutView, MessageView};
use polib::po_file;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// One translatable entry of a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Position of the entry in the store; pass it back to `set_translation`
    pub index: usize,
    /// Source text identifying the entry (the PO `msgid`)
    pub key: String,
    /// Existing translation, empty when untranslated
    pub translation: String,
}

impl CatalogEntry {
    pub fn is_translated(&self) -> bool {
        !self.translation.is_empty()
    }
}

/// A persistent sequence of (key, translation) pairs
pub trait CatalogStore {
    /// All translatable entries in file order
    fn entries(&self) -> Vec<CatalogEntry>;

    /// Set the translation of the entry at `index`
    fn set_translation(&mut self, index: usize, translation: String) -> MtResult<()>;
}

/// Gettext PO file loaded into memory
///
/// Only singular messages are exposed as entries; plural messages carry
/// several translations and are left for human translators.
///
/// Saving rewrites nothing but the `msgstr` lines of messages whose
/// translation was set, so file comments, header fields and the layout of
/// untouched messages come out byte for byte as they were read.
pub struct PoCatalog {
    catalog: Catalog,
    text: PoText,
    changed: BTreeSet<usize>,
}

impl std::fmt::Debug for PoCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoCatalog")
            .field("messages", &self.catalog.count())
            .field("changed", &self.changed.len())
            .finish()
    }
}

impl PoCatalog {
    /// Parse a PO file
    ///
    /// Header fields polib requires but the file lacks are filled with
    /// defaults for parsing only; they are never written back.
    pub fn load(path: &Path) -> MtResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            MtError::CatalogError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let text = PoText::new(source);
        let parse_error = |reason: String| {
            MtError::CatalogError(format!("Failed to parse '{}': {}", path.display(), reason))
        };

        let catalog = parse_po_text(&text.normalized()).map_err(parse_error)?;
        if catalog.count() != text.message_count() {
            return Err(parse_error(format!(
                "found {} message blocks but {} distinct messages; duplicate msgid?",
                text.message_count(),
                catalog.count()
            )));
        }

        debug!(path = %path.display(), messages = catalog.count(), "loaded PO catalog");
        Ok(Self {
            catalog,
            text,
            changed: BTreeSet::new(),
        })
    }

    /// Write the catalog, including every translation set so far, to `path`
    pub fn save(&self, path: &Path) -> MtResult<()> {
        let translations = self
            .changed
            .iter()
            .map(|&index| {
                self.catalog
                    .messages()
                    .nth(index)
                    .and_then(|message| message.msgstr().ok().map(str::to_string))
                    .map(|msgstr| (index, msgstr))
                    .ok_or_else(|| {
                        MtError::CatalogError(format!("No singular message at index {}", index))
                    })
            })
            .collect::<MtResult<Vec<_>>>()?;

        let contents = self.text.splice(&translations)?;
        std::fs::write(path, contents).map_err(|e| {
            MtError::CatalogError(format!("Failed to write '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), changed = translations.len(), "saved PO catalog");
        Ok(())
    }

    /// Number of messages in the file, plural ones included
    pub fn message_count(&self) -> usize {
        self.catalog.count()
    }
}

/// polib parses from a path only, and panics on some malformed input
fn parse_po_text(text: &str) -> Result<Catalog, String> {
    let mut file = tempfile::NamedTempFile::new().map_err(|e| e.to_string())?;
    file.write_all(text.as_bytes()).map_err(|e| e.to_string())?;
    let path = file.path();

    match std::panic::catch_unwind(|| po_file::parse(path)) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err("malformed PO syntax".to_string()),
    }
}

impl CatalogStore for PoCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        self.catalog
            .messages()
            .enumerate()
            .filter(|(_, message)| message.is_singular() && !message.msgid().is_empty())
            .map(|(index, message)| CatalogEntry {
                index,
                key: message.msgid().to_string(),
                translation: message.msgstr().unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn set_translation(&mut self, index: usize, translation: String) -> MtResult<()> {
        let mut message = self
            .catalog
            .messages_mut()
            .nth(index)
            .ok_or_else(|| MtError::CatalogError(format!("No message at index {}", index)))?;
        message.set_msgstr(translation).map_err(|e| {
            MtError::CatalogError(format!("Cannot set translation at index {}: {:?}", index, e))
        })?;
        self.changed.insert(index);
        Ok(())
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCatalog {
    entries: Vec<(String, String)>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, translation: &str) -> Self {
        self.entries.push((key.to_string(), translation.to_string()));
        self
    }

    /// Translation of the first entry with this key
    pub fn translation(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, translation)| translation.as_str())
    }
}

impl CatalogStore for MemoryCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (key, translation))| CatalogEntry {
                index,
                key: key.clone(),
                translation: translation.clone(),
            })
            .collect()
    }

    fn set_translation(&mut self, index: usize, translation: String) -> MtResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| MtError::CatalogError(format!("No entry at index {}", index)))?;
        entry.1 = translation;
        Ok(())
    }
}
