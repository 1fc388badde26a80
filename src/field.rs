//! Bound fields: one addressable value, rendered read-only or editable
//! depending on the store's editing flag.
//!
//! Text edits are staged in a local buffer and only committed to the store
//! when the field loses focus. Image uploads are read off the UI thread and
//! committed to every language at once.

use crate::{ContentStore, ContentValue, PathError, statics};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single line input.
    Text,
    /// Textarea; line breaks are kept in display mode.
    MultiLine,
    /// Data-URL image shared by every language.
    Image,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("reading {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} is not a supported image")]
    UnsupportedFormat { path: PathBuf },
    #[error("upload worker stopped before finishing")]
    Interrupted,
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug)]
pub struct BoundField {
    path: String,
    kind: FieldKind,
    /// Last authoritative value seen from the store.
    committed: String,
    /// Local edit buffer; only reaches the store through [`BoundField::commit`].
    buffer: String,
    editing: bool,
    upload: Option<Receiver<Result<String, UploadError>>>,
}

impl BoundField {
    /// `path` is relative to a language root, e.g. `portfolio.items.0.title`.
    pub fn new(path: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            kind,
            committed: String::new(),
            buffer: String::new(),
            editing: false,
            upload: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The authoritative value for the store's current language; missing
    /// paths read as blank.
    pub fn read(&self, store: &ContentStore) -> String {
        store
            .read(&self.path)
            .map(ContentValue::display_text)
            .unwrap_or_default()
    }

    /// Pull the current value from the store. If it changed (reset, language
    /// switch, another field) and this field is not mid-edit, the local
    /// buffer follows it.
    pub fn sync(&mut self, store: &ContentStore) {
        let value = self.read(store);
        if value != self.committed {
            self.committed = value;
            if !self.editing {
                self.buffer.clone_from(&self.committed);
            }
        }
    }

    /// The value to render in display mode.
    pub fn value(&self) -> &str {
        &self.committed
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The control gained focus.
    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Keystrokes land here, never in the store.
    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.buffer
    }

    /// The control lost focus: write the buffer through the store.
    /// Returns whether anything was written.
    pub fn commit(&mut self, store: &mut ContentStore) -> Result<bool, PathError> {
        self.editing = false;
        if self.buffer == self.committed {
            return Ok(false);
        }
        store.update(&self.path, ContentValue::String(self.buffer.clone()))?;
        self.committed.clone_from(&self.buffer);
        Ok(true)
    }

    /// Input width in characters, tracking the buffered text length.
    pub fn input_width_chars(&self) -> usize {
        self.buffer.chars().count().max(2)
    }

    pub fn is_processing(&self) -> bool {
        self.upload.is_some()
    }

    /// Start reading `file` on a worker thread. Ignored while a previous
    /// upload is still running.
    pub fn start_upload(&mut self, file: PathBuf) {
        if self.upload.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        tracing::debug!(field = %self.path, file = %file.display(), "reading image");
        thread::spawn(move || {
            // The receiver may be gone if the field was dropped; nothing to report then.
            let _ = tx.send(read_image_as_data_url(&file));
        });
        self.upload = Some(rx);
    }

    /// Deliver a finished upload. On success the image is written under
    /// every language; on failure the user is alerted and the tree is left
    /// alone. Returns `None` while the read is still running.
    pub fn poll_upload(&mut self, store: &mut ContentStore) -> Option<Result<(), UploadError>> {
        let rx = self.upload.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(UploadError::Interrupted),
        };
        self.upload = None;

        let outcome = result.and_then(|data_url| {
            Ok(store.update_both(&self.path, ContentValue::String(data_url))?)
        });
        match &outcome {
            Ok(()) => tracing::info!(field = %self.path, "image updated in all languages"),
            Err(e) => {
                tracing::error!(field = %self.path, "image processing failed: {e}");
                store.dialogs().alert(statics::EN_ALERT_IMAGE_FAILED);
            }
        }
        self.sync(store);
        Some(outcome)
    }
}

/// Read `file` fully and encode it as a self-contained `data:` URL.
pub fn read_image_as_data_url(file: &Path) -> Result<String, UploadError> {
    let bytes = fs::read(file).map_err(|source| UploadError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let mime = sniff_mime(&bytes, file).ok_or_else(|| UploadError::UnsupportedFormat {
        path: file.to_path_buf(),
    })?;
    Ok(encode_data_url(mime, &bytes))
}

fn sniff_mime(bytes: &[u8], file: &Path) -> Option<&'static str> {
    if let Ok(format) = image::guess_format(bytes) {
        return match format {
            image::ImageFormat::Png => Some("image/png"),
            image::ImageFormat::Jpeg => Some("image/jpeg"),
            image::ImageFormat::WebP => Some("image/webp"),
            image::ImageFormat::Gif => Some("image/gif"),
            _ => None,
        };
    }
    let ext = file.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Split a base64 `data:` URL back into its mime type and bytes.
pub fn decode_data_url(url: &str) -> Option<(&str, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = BASE64.decode(payload.trim()).ok()?;
    Some((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::{BoundField, FieldKind, decode_data_url, encode_data_url, read_image_as_data_url};
    use crate::{
        ContentStore, ContentValue, Language, dialogs::RecordingDialogs, storage::MemoryStorage,
    };
    use pretty_assertions::assert_eq;

    fn store() -> ContentStore {
        ContentStore::initialize(
            ContentValue::parse(r#"{"zh":{"hero":{"name":"甲"}},"en":{"hero":{"name":"A"}}}"#)
                .unwrap(),
            Box::new(MemoryStorage::new()),
            "field_test",
            Box::new(RecordingDialogs::answering(true)),
        )
    }

    #[test]
    fn keystrokes_stay_local_until_commit() {
        let mut store = store();
        let mut field = BoundField::new("hero.name", FieldKind::Text);
        field.sync(&store);
        assert_eq!(field.buffer(), "甲");

        field.begin_edit();
        field.buffer_mut().push_str("乙");
        assert_eq!(store.revision(), 0);
        assert_eq!(field.read(&store), "甲");

        assert!(field.commit(&mut store).unwrap());
        assert_eq!(store.revision(), 1);
        assert_eq!(field.read(&store), "甲乙");
        assert!(!field.is_editing());
    }

    #[test]
    fn unchanged_commit_writes_nothing() {
        let mut store = store();
        let mut field = BoundField::new("hero.name", FieldKind::Text);
        field.sync(&store);
        field.begin_edit();
        assert!(!field.commit(&mut store).unwrap());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn idle_field_follows_language_switch() {
        let mut store = store();
        let mut field = BoundField::new("hero.name", FieldKind::Text);
        field.sync(&store);
        store.set_language(Language::En);
        field.sync(&store);
        assert_eq!(field.buffer(), "A");
    }

    #[test]
    fn field_mid_edit_keeps_its_buffer() {
        let mut store = store();
        let mut field = BoundField::new("hero.name", FieldKind::Text);
        field.sync(&store);
        field.begin_edit();
        field.buffer_mut().push('!');
        store.update("hero.name", "外部".into()).unwrap();
        field.sync(&store);
        assert_eq!(field.buffer(), "甲!");
        assert_eq!(field.value(), "外部");
    }

    #[test]
    fn missing_path_reads_blank() {
        let store = store();
        let mut field = BoundField::new("portfolio.items.2.title", FieldKind::Text);
        field.sync(&store);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn input_width_tracks_characters_with_minimum() {
        let mut field = BoundField::new("hero.name", FieldKind::Text);
        assert_eq!(field.input_width_chars(), 2);
        field.buffer_mut().push_str("你好世界");
        assert_eq!(field.input_width_chars(), 4);
    }

    #[test]
    fn data_urls_round_trip_bytes() {
        let url = encode_data_url("image/png", &[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
        assert_eq!(decode_data_url(&url), Some(("image/png", vec![1, 2, 3])));
        assert_eq!(decode_data_url("https://example.com/a.png"), None);
    }

    #[test]
    fn image_bytes_are_sniffed_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.bin");
        std::fs::write(&file, b"\x89PNG\r\n\x1a\n rest").unwrap();
        let url = read_image_as_data_url(&file).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();
        assert!(read_image_as_data_url(&text).is_err());
    }
}
