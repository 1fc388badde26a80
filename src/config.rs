use crate::{
    ContentStore, Language, content, dialogs::Dialogs, statics, storage::FileStorage,
};
use std::path::PathBuf;

/// Where content is persisted and how the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub quota_bytes: u64,
    pub language: Language,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            storage_key: statics::STORAGE_KEY.to_string(),
            quota_bytes: statics::DEFAULT_QUOTA_BYTES,
            language: Language::default(),
        }
    }
}

pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(statics::DATA_DIR_NAME)
}

impl EditorConfig {
    /// Build the session store: persisted content if present, else the
    /// built-in default.
    pub fn open_store(&self, dialogs: Box<dyn Dialogs>) -> anyhow::Result<ContentStore> {
        let default_tree = content::builtin_default()?;
        let storage = FileStorage::new(&self.storage_dir, self.quota_bytes);
        tracing::info!(
            dir = %self.storage_dir.display(),
            key = %self.storage_key,
            quota = self.quota_bytes,
            "opening content store"
        );
        let mut store =
            ContentStore::initialize(default_tree, Box::new(storage), &self.storage_key, dialogs);
        store.set_language(self.language);
        Ok(store)
    }
}
