use folio::{
    BoundField, ContentStore, ContentValue, FieldKind, Language, MemoryStorage, UploadError,
    dialogs::RecordingDialogs, field::decode_data_url, statics,
};
use pretty_assertions::assert_eq;
use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn store(dialogs: &RecordingDialogs) -> ContentStore {
    ContentStore::initialize(
        ContentValue::parse(r#"{"zh":{"hero":{"image":""}},"en":{"hero":{"image":""}}}"#).unwrap(),
        Box::new(MemoryStorage::new()),
        "upload_test",
        Box::new(dialogs.clone()),
    )
}

fn upload(field: &mut BoundField, store: &mut ContentStore, file: PathBuf) -> Result<(), UploadError> {
    field.start_upload(file);
    assert!(field.is_processing());
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(result) = field.poll_upload(store) {
            assert!(!field.is_processing());
            return result;
        }
        assert!(Instant::now() < deadline, "upload never finished");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn uploaded_image_lands_in_every_language() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("avatar.png");
    std::fs::write(&file, PNG_MAGIC).unwrap();

    let dialogs = RecordingDialogs::default();
    let mut store = store(&dialogs);
    store.set_language(Language::En);
    let mut field = BoundField::new("hero.image", FieldKind::Image);
    field.sync(&store);

    upload(&mut field, &mut store, file).unwrap();

    let zh = store.read_in(Language::Zh, "hero.image").and_then(ContentValue::as_str);
    let en = store.read_in(Language::En, "hero.image").and_then(ContentValue::as_str);
    assert_eq!(zh, en);
    let (mime, bytes) = decode_data_url(zh.unwrap()).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, PNG_MAGIC);
    assert_eq!(field.value(), zh.unwrap());
    assert_eq!(store.revision(), 1);
    assert!(dialogs.messages().is_empty());
}

#[test]
fn unreadable_upload_alerts_and_leaves_content_alone() {
    let dir = tempfile::tempdir().unwrap();
    let dialogs = RecordingDialogs::default();
    let mut store = store(&dialogs);
    let before = store.content().clone();
    let mut field = BoundField::new("hero.image", FieldKind::Image);

    let missing = upload(&mut field, &mut store, dir.path().join("nope.png"));
    assert!(matches!(missing, Err(UploadError::Read { .. })));

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not an image").unwrap();
    let unsupported = upload(&mut field, &mut store, text);
    assert!(matches!(unsupported, Err(UploadError::UnsupportedFormat { .. })));

    assert_eq!(store.content(), &before);
    assert_eq!(store.revision(), 0);
    let alert = format!("alert: {}", statics::EN_ALERT_IMAGE_FAILED);
    assert_eq!(dialogs.messages(), vec![alert.clone(), alert]);
}

#[test]
fn second_upload_is_ignored_while_busy() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.png");
    std::fs::write(&first, PNG_MAGIC).unwrap();

    let dialogs = RecordingDialogs::default();
    let mut store = store(&dialogs);
    let mut field = BoundField::new("hero.image", FieldKind::Image);

    field.start_upload(first);
    field.start_upload(dir.path().join("missing.png"));
    let deadline = Instant::now() + Duration::from_secs(10);
    let result = loop {
        if let Some(result) = field.poll_upload(&mut store) {
            break result;
        }
        assert!(Instant::now() < deadline, "upload never finished");
        thread::sleep(Duration::from_millis(5));
    };
    assert!(result.is_ok());
    assert!(dialogs.messages().is_empty());
}
