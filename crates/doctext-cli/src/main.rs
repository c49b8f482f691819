use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use doctext_core::{Settings, UploadPayload, config_file};

mod output;

use output::ColorMode;

/// Extract plain text from PDF, DOCX and image files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a .pdf, .docx, .jpg, .jpeg or .png file
    Extract {
        /// Path to the file
        file_path: PathBuf,

        /// Print the result as JSON, in the same shape the server returns
        #[arg(long)]
        json: bool,

        /// Path to the tesseract binary
        #[arg(long)]
        tesseract: Option<PathBuf>,

        /// Tesseract languages, e.g. "eng" or "deu+eng"
        #[arg(long)]
        lang: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the resolved configuration as TOML
    Config,
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = config_file::load_config().with_env().resolve();

    match cli.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract {
            file_path,
            json,
            tesseract,
            lang,
            no_color,
        } => {
            let mut settings = settings;
            if let Some(cmd) = tesseract {
                settings.tesseract_cmd = cmd;
            }
            if let Some(langs) = lang {
                settings.ocr_languages = Some(langs);
            }
            let use_color = !no_color
                && std::env::var_os("NO_COLOR").is_none()
                && std::io::stderr().is_terminal();
            extract(&file_path, &settings, json, ColorMode(use_color))
        }
    }
}

fn extract(
    file_path: &Path,
    settings: &Settings,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<ExitCode> {
    let data = std::fs::read(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dispatcher = doctext_ingest::dispatcher(settings)?;
    let payload = UploadPayload::new(file_name, data);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut err_out = stderr.lock();

    match dispatcher.extract(&payload) {
        Ok(result) => {
            if json {
                output::print_json(&mut out, &result)?;
            } else {
                output::print_header(&mut err_out, &result, color)?;
                output::print_text(&mut out, &result)?;
            }
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "extraction failed");
            if json {
                output::print_json_error(&mut out, &e)?;
                out.flush()?;
            } else {
                output::print_error(&mut err_out, &e, color)?;
            }
            // 2 for problems with the input, 1 for local faults
            Ok(if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
