use crate::{ContentValue, statics};
use anyhow::Context;
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// A source module assigning the tree to a typed constant; drop-in
    /// replacement for the built-in default.
    #[default]
    Module,
    Json,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Module => statics::EXPORT_MODULE_FILE_NAME,
            ExportFormat::Json => statics::EXPORT_JSON_FILE_NAME,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Module => statics::EXPORT_MODULE_MIME,
            ExportFormat::Json => statics::EXPORT_JSON_MIME,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Module => "ts",
            ExportFormat::Json => "json",
        }
    }
}

/// A rendered export, ready to be saved wherever the user chooses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub contents: String,
}

impl ExportFile {
    pub fn render(tree: &ContentValue, format: ExportFormat) -> Self {
        let json = tree.to_json_pretty();
        let contents = match format {
            ExportFormat::Module => format!(
                "{}\n\n{} {json};\n",
                statics::EXPORT_MODULE_HEADER,
                statics::EXPORT_MODULE_CONST
            ),
            ExportFormat::Json => format!("{json}\n"),
        };
        Self {
            file_name: format.file_name(),
            mime: format.mime(),
            contents,
        }
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, self.contents.as_bytes()).with_context(|| format!("writing {path:?}"))?;
        tracing::info!(path = %path.display(), bytes = self.contents.len(), "exported content");
        Ok(())
    }
}
