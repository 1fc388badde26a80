//! Core library for Folio, a bilingual portfolio with an inline content editor.
//! Provides the content tree, dot-path addressing, the editing session store
//! with local persistence and export, and the bound-field editing contract.

pub mod config;
pub mod content;
pub mod dialogs;
pub mod export;
pub mod field;
mod gui;
pub mod path;
pub mod statics;
pub mod storage;
pub mod store;
mod value;

pub use config::EditorConfig;
pub use content::Language;
pub use export::{ExportFile, ExportFormat};
pub use field::{BoundField, FieldKind, UploadError};
pub use gui::run_gui;
pub use path::{ContentPath, PathError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{ContentStore, LoadSource, Snapshot, StoreEvent};
pub use value::{ContentNumber, ContentValue};
