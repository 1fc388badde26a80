// Central place for UI strings and other non-localized constants.
// Keep these out of gui.rs and store.rs to reduce duplication and make tweaks safer.

// English UI strings (EN_ prefix; the site content itself is bilingual, the editor chrome is not)
pub const EN_APP_TITLE: &str = "Folio";

pub const EN_BTN_EDIT: &str = "Edit Content";
pub const EN_BTN_SAVE_EXIT: &str = "Save & Exit";
pub const EN_BTN_EXPORT_MODULE: &str = "Export data.ts";
pub const EN_BTN_EXPORT_JSON: &str = "Export JSON";
pub const EN_BTN_RESET: &str = "Reset to Default";
pub const EN_BTN_CHANGE_PHOTO: &str = "Change Photo";
pub const EN_BTN_VIEW_PROJECT: &str = "View project ->";
pub const EN_BTN_CLOSE: &str = "Close";
pub const EN_BTN_CLEAR: &str = "Clear";
pub const EN_BTN_TOGGLE_THEME: &str = "Toggle Theme";

pub const EN_LANG_ZH: &str = "中文";
pub const EN_LANG_EN: &str = "EN";

pub const EN_BANNER_EDITING: &str = "Editing Mode Active";
pub const EN_LABEL_PROCESSING: &str = "Processing...";
pub const EN_BADGE_UNSAVED: &str = "not saved";
pub const EN_PLACEHOLDER_TEXT: &str = "...";
pub const EN_ALT_IMAGE: &str = "Editable image";

pub const EN_WINDOW_ZOOM: &str = "Image";
pub const EN_HINT_ZOOM: &str = "Click to enlarge";

pub const EN_HEADING_TIMELINE: &str = "Timeline";
pub const EN_HEADING_ROLE: &str = "Role";
pub const EN_HEADING_IMPACT: &str = "Impact";

pub const EN_KIND_MOBILE: &str = "Mobile";
pub const EN_KIND_DESKTOP: &str = "Desktop";

pub const EN_STATUS_LOADED_PERSISTED: &str = "Loaded saved edits";
pub const EN_STATUS_LOADED_DEFAULT: &str = "Showing default content";
pub const EN_STATUS_SAVED: &str = "Saved";
pub const EN_STATUS_RESET: &str = "Reset to default";
pub const EN_STATUS_EXPORTED: &str = "Exported";
pub const EN_LABEL_REVISION: &str = "revision:";
pub const EN_LABEL_LANGUAGE: &str = "language:";
pub const EN_ERR_EXPORT: &str = "Failed to export:";
pub const EN_ERR_CONTENT_SHAPE: &str = "Content lists cannot be shown:";
pub const EN_ERR_FIELD_WRITE: &str = "Failed to save field:";

// Dialog text
pub const EN_CONFIRM_RESET: &str = "Are you sure you want to reset all changes to default?";
pub const EN_ERR_STORAGE_FULL: &str = "Storage full! Image might be too large.";
pub const EN_ALERT_STORAGE_FULL: &str = "Warning: Storage full. The last change (likely a large image) could not be saved to browser storage. Please reset or use smaller images.";
pub const EN_ALERT_IMAGE_FAILED: &str = "Failed to process image. Please try a different file.";

// Persisted storage
pub const STORAGE_KEY: &str = "portfolio_content";
pub const STORAGE_FILE_EXTENSION: &str = "json";
/// Typical per-origin browser localStorage allowance.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
pub const DATA_DIR_NAME: &str = "folio";

// Export
pub const EXPORT_MODULE_FILE_NAME: &str = "data.ts";
pub const EXPORT_MODULE_MIME: &str = "text/typescript";
pub const EXPORT_MODULE_HEADER: &str = "import { DataStore } from '../types';";
pub const EXPORT_MODULE_CONST: &str = "export const DATA: DataStore =";
pub const EXPORT_JSON_FILE_NAME: &str = "content.json";
pub const EXPORT_JSON_MIME: &str = "application/json";

// Image upload
pub const IMAGE_FILTER_NAME: &str = "Images";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
