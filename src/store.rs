//! The editing session: owner of the content tree, the active language and
//! the editing flag, and the only place any of them change.

use crate::{
    ContentValue,
    content::{self, Language},
    dialogs::Dialogs,
    export::{ExportFile, ExportFormat},
    path::{self, ContentPath, PathError},
    statics,
    storage::{KeyValueStorage, StorageError},
};
use std::sync::{Arc, mpsc};

/// An immutable view of the whole bilingual tree.
pub type Snapshot = Arc<ContentValue>;

/// Broadcast to subscribers after every state transition.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Content { revision: u64, tree: Snapshot },
    Language(Language),
    Editing(bool),
}

/// Where the initial tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Default,
}

pub struct ContentStore {
    tree: Snapshot,
    default_tree: Snapshot,
    language: Language,
    editing: bool,
    last_persist_error: Option<String>,
    revision: u64,
    load_source: LoadSource,
    storage: Box<dyn KeyValueStorage>,
    storage_key: String,
    dialogs: Box<dyn Dialogs>,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("language", &self.language)
            .field("editing", &self.editing)
            .field("revision", &self.revision)
            .field("load_source", &self.load_source)
            .field("last_persist_error", &self.last_persist_error)
            .finish_non_exhaustive()
    }
}

impl ContentStore {
    /// Load the persisted tree, or fall back to `default_tree` when there is
    /// none or it cannot be read or parsed. Failures are logged, not surfaced.
    pub fn initialize(
        default_tree: ContentValue,
        storage: Box<dyn KeyValueStorage>,
        storage_key: impl Into<String>,
        dialogs: Box<dyn Dialogs>,
    ) -> Self {
        let storage_key = storage_key.into();
        let default_tree = Arc::new(default_tree);

        let (tree, load_source) = match storage.get_item(&storage_key) {
            Ok(Some(text)) => match ContentValue::parse(&text) {
                Ok(tree) => {
                    tracing::info!(key = %storage_key, bytes = text.len(), "loaded persisted content");
                    (Arc::new(tree), LoadSource::Persisted)
                }
                Err(e) => {
                    tracing::warn!(key = %storage_key, "failed to parse persisted content, using default: {e:#}");
                    (default_tree.clone(), LoadSource::Default)
                }
            },
            Ok(None) => {
                tracing::debug!(key = %storage_key, "no persisted content, using default");
                (default_tree.clone(), LoadSource::Default)
            }
            Err(e) => {
                tracing::warn!(key = %storage_key, "failed to read persisted content, using default: {e}");
                (default_tree.clone(), LoadSource::Default)
            }
        };

        if load_source == LoadSource::Persisted {
            for mismatch in content::shape_mismatches(&tree) {
                tracing::warn!("persisted languages differ in shape: {mismatch}");
            }
        }

        Self {
            tree,
            default_tree,
            language: Language::default(),
            editing: false,
            last_persist_error: None,
            revision: 0,
            load_source,
            storage,
            storage_key,
            dialogs,
            subscribers: Vec::new(),
        }
    }

    pub fn content(&self) -> &Snapshot {
        &self.tree
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Bumped on every tree replacement.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn dialogs(&self) -> &dyn Dialogs {
        self.dialogs.as_ref()
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Read a language-relative path under the current language.
    pub fn read(&self, path: &str) -> Option<&ContentValue> {
        self.read_in(self.language, path)
    }

    pub fn read_in(&self, lang: Language, path: &str) -> Option<&ContentValue> {
        let path: ContentPath = path.parse().ok()?;
        path::read(&self.tree, &path.under(lang))
    }

    pub fn set_language(&mut self, lang: Language) {
        if self.language == lang {
            return;
        }
        self.language = lang;
        tracing::debug!(%lang, "language switched");
        self.broadcast(StoreEvent::Language(lang));
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        tracing::debug!(editing = self.editing, "editing toggled");
        self.broadcast(StoreEvent::Editing(self.editing));
    }

    /// Write `value` at `path` under the current language, then persist.
    /// A rejected path leaves the tree, the revision and storage alone.
    pub fn update(&mut self, path: &str, value: ContentValue) -> Result<(), PathError> {
        let path: ContentPath = path.parse()?;
        let next = path::write(&self.tree, &path.under(self.language), value)?;
        self.replace(next);
        Ok(())
    }

    /// Write the same `value` at `path` under every language in one step.
    /// Observers see either neither write or both.
    pub fn update_both(&mut self, path: &str, value: ContentValue) -> Result<(), PathError> {
        let path: ContentPath = path.parse()?;
        let mut next = ContentValue::clone(&self.tree);
        for lang in Language::ALL {
            path::write_in_place(&mut next, &path.under(lang), value.clone())?;
        }
        self.replace(next);
        Ok(())
    }

    /// Serialize the tree into storage.
    ///
    /// A capacity failure records [`statics::EN_ERR_STORAGE_FULL`] and warns
    /// the user; the in-memory tree is kept either way. Other failures are
    /// only logged. A successful write clears any recorded error.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let text = self.tree.to_json_compact();
        match self.storage.set_item(&self.storage_key, &text) {
            Ok(()) => {
                tracing::trace!(bytes = text.len(), "persisted content");
                self.last_persist_error = None;
                Ok(())
            }
            Err(e) if e.is_quota_exceeded() => {
                tracing::warn!("persist failed, keeping edit in memory only: {e}");
                self.last_persist_error = Some(statics::EN_ERR_STORAGE_FULL.to_string());
                self.dialogs.alert(statics::EN_ALERT_STORAGE_FULL);
                Err(e)
            }
            Err(e) => {
                tracing::error!("persist failed: {e}");
                Err(e)
            }
        }
    }

    /// After confirmation, restore the built-in default and clear storage.
    /// Returns whether the reset happened.
    pub fn reset(&mut self) -> bool {
        if !self.dialogs.confirm(statics::EN_CONFIRM_RESET) {
            return false;
        }
        self.tree = self.default_tree.clone();
        self.revision += 1;
        if let Err(e) = self.storage.remove_item(&self.storage_key) {
            tracing::error!("failed to clear persisted content: {e}");
        }
        self.last_persist_error = None;
        tracing::info!("content reset to default");
        self.broadcast_content();
        true
    }

    pub fn export(&self, format: ExportFormat) -> ExportFile {
        ExportFile::render(&self.tree, format)
    }

    fn replace(&mut self, next: ContentValue) {
        self.tree = Arc::new(next);
        self.revision += 1;
        self.broadcast_content();
        // Failures are recorded on the store; the new tree stands regardless.
        let _ = self.persist();
    }

    fn broadcast_content(&mut self) {
        let event = StoreEvent::Content {
            revision: self.revision,
            tree: self.tree.clone(),
        };
        self.broadcast(event);
    }

    fn broadcast(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentStore, LoadSource, StoreEvent};
    use crate::{
        ContentValue,
        content::Language,
        dialogs::RecordingDialogs,
        storage::{KeyValueStorage, MemoryStorage},
    };
    use pretty_assertions::assert_eq;

    const KEY: &str = "test_content";

    fn sample() -> ContentValue {
        ContentValue::parse(r#"{"zh":{"hero":{"name":"A"}},"en":{"hero":{"name":"B"}}}"#).unwrap()
    }

    fn store_with(storage: MemoryStorage) -> ContentStore {
        ContentStore::initialize(
            sample(),
            Box::new(storage),
            KEY,
            Box::new(RecordingDialogs::answering(true)),
        )
    }

    #[test]
    fn corrupt_persisted_content_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.insert_raw(KEY, "{ not json");
        let store = store_with(storage);
        assert_eq!(store.load_source(), LoadSource::Default);
        assert_eq!(**store.content(), sample());
    }

    #[test]
    fn unreadable_storage_falls_back_to_default() {
        struct Broken;
        impl KeyValueStorage for Broken {
            fn get_item(&self, key: &str) -> Result<Option<String>, crate::StorageError> {
                Err(crate::StorageError::Io {
                    key: key.into(),
                    source: std::io::Error::other("denied"),
                })
            }
            fn set_item(&mut self, _: &str, _: &str) -> Result<(), crate::StorageError> {
                Ok(())
            }
            fn remove_item(&mut self, _: &str) -> Result<(), crate::StorageError> {
                Ok(())
            }
        }

        let store = ContentStore::initialize(
            sample(),
            Box::new(Broken),
            KEY,
            Box::new(RecordingDialogs::default()),
        );
        assert_eq!(store.load_source(), LoadSource::Default);
        assert_eq!(store.last_persist_error(), None);
    }

    #[test]
    fn update_both_broadcasts_a_single_complete_snapshot() {
        let mut store = store_with(MemoryStorage::new());
        let rx = store.subscribe();
        store.update_both("hero.image", "data:image/png;base64,AA==".into()).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        let StoreEvent::Content { revision, tree } = &events[0] else {
            panic!("expected a content event");
        };
        assert_eq!(*revision, 1);
        for lang in Language::ALL {
            assert_eq!(
                tree.get(lang.code()).and_then(|d| d.get("hero")).and_then(|h| h.get("image")),
                Some(&ContentValue::from("data:image/png;base64,AA=="))
            );
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = store_with(MemoryStorage::new());
        drop(store.subscribe());
        let rx = store.subscribe();
        store.toggle_editing();
        assert_eq!(store.subscribers.len(), 1);
        assert!(matches!(rx.try_recv(), Ok(StoreEvent::Editing(true))));
    }

    #[test]
    fn invalid_path_is_rejected_without_touching_the_tree() {
        let mut store = store_with(MemoryStorage::new());
        assert!(store.update("hero..name", "x".into()).is_err());
        assert_eq!(store.revision(), 0);
        assert_eq!(**store.content(), sample());
    }

    #[test]
    fn update_both_rejected_in_one_language_writes_neither() {
        let mut store = ContentStore::initialize(
            ContentValue::parse(r#"{"zh":{"hero":{"name":"A"}},"en":{"hero":[]}}"#).unwrap(),
            Box::new(MemoryStorage::new()),
            KEY,
            Box::new(RecordingDialogs::default()),
        );
        let before = store.content().clone();
        assert!(store.update_both("hero.name", "x".into()).is_err());
        assert_eq!(store.content(), &before);
        assert_eq!(store.revision(), 0);
    }
}
