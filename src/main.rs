//! payqr command-line entrypoint

use clap::{Parser, Subcommand, ValueEnum};
use payqr::fields::REQUIRED_FIELD_MESSAGE;
use payqr::{
    Clipboard, ExportEncoder, FieldName, JsonFileStore, MemoryClipboard, PaymentForm,
    PayqrConfig, QrRenderer, ResvgDecoder, Result, logging,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "payqr",
    version,
    about = "GOST ST00012 payment QR generator"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to payqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Override the file the form record is persisted to
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the form, validation errors and the payload
    Show {
        /// Output as JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Also draw the QR code in the terminal
        #[arg(long)]
        qr: bool,
    },
    /// Set one field and save the form
    Set {
        /// Field key (Name, PersonalAcc, BankName, BIC, CorrespAcc, PayeeINN, Purpose, Sum)
        field: FieldName,
        /// New value; Sum is given in rubles
        value: String,
    },
    /// Forget the saved form and start from defaults
    Reset,
    /// Write the QR code to qr-code.png or qr-code.svg
    Export {
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
        format: ExportFormat,

        /// Directory to write into
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
    /// Copy the QR image or the payload text to the clipboard
    Copy {
        /// What to copy
        #[arg(value_enum)]
        what: CopyTarget,
    },
    /// List field keys with their form labels
    Labels,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Png,
    Svg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CopyTarget {
    Image,
    Text,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("{}", err.user_message());
            eprintln!("({err})");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = PayqrConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.store {
        config.storage.path = path;
    }

    logging::init(&config.logging)?;

    let store = JsonFileStore::from_options(&config.storage);
    info!(path = %store.path().display(), "Opening form");
    let mut form = PaymentForm::open(store)?;
    let renderer = QrRenderer::new(config.qr.clone());

    match cli.command {
        Command::Show { json, qr } => show(&form, &renderer, json, qr),
        Command::Set { field, value } => {
            form.edit(field, value)?;
            show(&form, &renderer, false, false)
        }
        Command::Reset => {
            form.reset()?;
            println!("Form reset to defaults");
            Ok(())
        }
        Command::Export { format, out } => {
            form.outcome().require_valid()?;
            let rendered = form.render(&renderer)?;
            let encoder =
                ExportEncoder::new(Arc::new(ResvgDecoder), Arc::new(MemoryClipboard::new()));
            let artifact = match format {
                ExportFormat::Png => encoder.export_as_image(&rendered).await?,
                ExportFormat::Svg => encoder.export_as_vector(&rendered)?,
            };
            let path = artifact.save_to(&out).await?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Copy { what } => {
            let encoder = ExportEncoder::new(Arc::new(ResvgDecoder), system_clipboard()?);
            match what {
                CopyTarget::Image => {
                    form.outcome().require_valid()?;
                    let rendered = form.render(&renderer)?;
                    encoder.copy_image_to_clipboard(&rendered).await?;
                    println!("QR-код скопирован в буфер обмена");
                }
                CopyTarget::Text => {
                    let payload = form.outcome().require_valid()?;
                    encoder.copy_text_to_clipboard(payload).await?;
                    println!("{payload}");
                }
            }
            Ok(())
        }
        Command::Labels => {
            for field in FieldName::ALL {
                println!("{:<12} {}", field.key(), field.label());
            }
            Ok(())
        }
    }
}

fn show(
    form: &PaymentForm<JsonFileStore>,
    renderer: &QrRenderer,
    as_json: bool,
    draw: bool,
) -> Result<()> {
    let outcome = form.outcome();

    if as_json {
        let errors: Vec<_> = outcome.errors.iter().map(|f| f.key()).collect();
        let root = json!({
            "fields": form.fields(),
            "valid": outcome.is_valid(),
            "errors": errors,
            "payload": outcome.payload,
        });
        println!("{}", serde_json::to_string_pretty(&root)?);
        return Ok(());
    }

    for (field, value) in form.fields().iter() {
        let marker = if outcome.has_error(field) {
            format!("  <- {REQUIRED_FIELD_MESSAGE}")
        } else {
            String::new()
        };
        println!("{:<32} {value}{marker}", field.label());
    }
    println!();

    if !outcome.is_valid() {
        println!("Payload (incomplete): {}", outcome.payload);
        return Ok(());
    }

    println!("{}", outcome.payload);
    if draw {
        println!();
        println!("{}", renderer.render_terminal(&outcome.payload)?);
    }
    Ok(())
}

#[cfg(feature = "system-clipboard")]
fn system_clipboard() -> Result<Arc<dyn Clipboard>> {
    Ok(Arc::new(payqr::SystemClipboard))
}

#[cfg(not(feature = "system-clipboard"))]
fn system_clipboard() -> Result<Arc<dyn Clipboard>> {
    Err(payqr::Error::Clipboard(
        "built without the `system-clipboard` feature".to_string(),
    ))
}
