//! Machine translation for gettext catalogs
//!
//! Localization strings carry `%(name)s` interpolation placeholders that
//! must come out of machine translation exactly as they went in. This crate
//! masks them with marker tokens, calls a translation provider, restores
//! them, and applies that to whole PO files.
//!
//! # Workflow Example
//!
//! ```ignore
//! use polyglot_mt::{BatchOptions, DeepLProvider, PlaceholderTranslator, translate_po_file};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Provider configured from DEEPL_API_KEY
//!     let provider = DeepLProvider::from_env()?;
//!
//!     // 2. Wrap it so placeholders survive
//!     let translator = PlaceholderTranslator::new(provider);
//!
//!     // 3. Translate every empty msgstr, keep the rest
//!     let report = translate_po_file(
//!         &translator,
//!         Path::new("en/LC_MESSAGES/messages.po"),
//!         Path::new("pl/LC_MESSAGES/messages.po"),
//!         "PL",
//!         Some("EN"),
//!         &BatchOptions::default(),
//!     )
//!     .await?;
//!
//!     println!("{} translated, {} failed", report.translated(), report.failed());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod catalog;
pub mod config;
pub mod deepl;
pub mod error;
pub mod mock;
pub mod placeholder;
mod po_text;
pub mod translator;

// Re-export main types for convenient access
pub use batch::{
    BatchOptions, BatchReport, EntryOutcome, EntryStatus, translate_catalog, translate_po_file,
};
pub use catalog::{CatalogEntry, CatalogStore, MemoryCatalog, PoCatalog};
pub use config::DeepLConfig;
pub use deepl::DeepLProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use placeholder::{MarkerPolicy, MaskedText, Placeholder, RestoredText, has_placeholders, mask};
pub use translator::{MachineTranslator, PlaceholderTranslator};
