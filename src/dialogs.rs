//! Blocking user prompts used by the store and bound fields.

use std::sync::{Arc, Mutex};

pub trait Dialogs {
    /// Ask a yes/no question; `true` means the user agreed.
    fn confirm(&self, message: &str) -> bool;
    /// Show a warning the user has to acknowledge.
    fn alert(&self, message: &str);
}

/// Native message boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn confirm(&self, message: &str) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(crate::statics::EN_APP_TITLE)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::OkCancel)
            .show();
        matches!(answer, rfd::MessageDialogResult::Ok)
    }

    fn alert(&self, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(crate::statics::EN_APP_TITLE)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// For the command line: alerts go to the log, confirmations get a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessDialogs {
    pub assume_yes: bool,
}

impl Dialogs for HeadlessDialogs {
    fn confirm(&self, message: &str) -> bool {
        tracing::info!(answer = self.assume_yes, "{message}");
        self.assume_yes
    }

    fn alert(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Records every prompt; confirmations answer `answer`. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDialogs {
    pub answer: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingDialogs {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, entry: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }
}

impl Dialogs for RecordingDialogs {
    fn confirm(&self, message: &str) -> bool {
        self.push(format!("confirm: {message}"));
        self.answer
    }

    fn alert(&self, message: &str) {
        self.push(format!("alert: {message}"));
    }
}
