use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use folio::{EditorConfig, ExportFormat, Language, dialogs::HeadlessDialogs, statics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Folio - bilingual portfolio content editor
#[derive(Parser, Debug)]
#[command(name = "folio", version)]
struct Args {
    /// Directory holding persisted content
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Storage key the content tree is saved under
    #[arg(long, global = true, default_value = statics::STORAGE_KEY)]
    storage_key: String,

    /// Byte quota for persisted content
    #[arg(long, global = true, default_value_t = statics::DEFAULT_QUOTA_BYTES)]
    quota_bytes: u64,

    /// Starting language (zh or en)
    #[arg(long, global = true, default_value = "zh")]
    lang: Language,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the editor window (default)
    Gui,
    /// Write the current content to a file
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Module)]
        format: FormatArg,
        /// Output path; defaults to data.ts / content.json in the working directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Discard persisted edits and return to the built-in default
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Module,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Module => ExportFormat::Module,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = EditorConfig {
        storage_dir: args
            .storage_dir
            .unwrap_or_else(folio::config::default_storage_dir),
        storage_key: args.storage_key,
        quota_bytes: args.quota_bytes,
        language: args.lang,
    };

    match args.command.unwrap_or(Command::Gui) {
        Command::Gui => {
            folio::run_gui(config).map_err(|e| anyhow::anyhow!("GUI failed: {e}"))?;
        }
        Command::Export { format, out } => {
            let store = config.open_store(Box::new(HeadlessDialogs { assume_yes: false }))?;
            let file = store.export(format.into());
            let out = out.unwrap_or_else(|| PathBuf::from(file.file_name));
            file.write_to(&out)
                .with_context(|| format!("exporting to {}", out.display()))?;
        }
        Command::Reset { yes } => {
            let mut store = config.open_store(Box::new(HeadlessDialogs { assume_yes: yes }))?;
            if !store.reset() {
                tracing::info!("reset cancelled; pass --yes to confirm");
            }
        }
    }
    Ok(())
}
