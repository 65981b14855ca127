//! CLI binary for media-convert-client.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig`, drives one conversion form and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use media_convert_client::{
    ClientConfig, ConversionCategory, ConversionForms, ConversionObserver, ConversionOutcome,
    DirectorySink, ObjectUrlStore, PreviewRenderer, SelectedFile,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner while the server converts, and alerts on
/// stderr.
struct CliObserver {
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
}

impl CliObserver {
    fn new(show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            show_spinner,
        })
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl ConversionObserver for CliObserver {
    fn on_submit(
        &self,
        category: ConversionCategory,
        file_name: &str,
        size: u64,
        target_format: &str,
    ) {
        if !self.show_spinner {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(format!("Converting {category}"));
        bar.set_message(format!(
            "{file_name} {} → {}",
            dim(&format!("({size} bytes)")),
            target_format.to_ascii_uppercase()
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap() = Some(bar);
    }

    fn on_response(&self, _category: ConversionCategory, _outcome: &ConversionOutcome) {
        self.stop_spinner();
    }

    fn on_download(&self, _category: ConversionCategory, filename: &str, size: usize) {
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(filename),
            dim(&format!("{size} bytes"))
        );
    }

    fn on_failure(&self, _category: ConversionCategory, message: &str) {
        self.stop_spinner();
        eprintln!("{} {}", red("✘"), red(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a WAV recording to MP3 in the current directory
  mediaconv convert song.wav --to mp3

  # Category is detected from the file; override it when detection fails
  mediaconv convert scan.bin --category image --to png -o out/

  # Talk to a remote conversion service
  mediaconv --server http://converter.internal:8080 convert talk.mkv --to mp4

  # Show what the preview area would display
  mediaconv preview report.pdf

  # List categories, endpoints, size limits and formats
  mediaconv formats --json

ENVIRONMENT VARIABLES:
  MEDIACONV_SERVER      Base URL of the conversion service
  MEDIACONV_TIMEOUT     Request timeout in seconds (default: none)
  MEDIACONV_OUTPUT_DIR  Directory converted files are saved into
  RUST_LOG              Log filter, overrides --verbose / --quiet
"#;

/// Convert media files through a remote conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "mediaconv",
    version,
    about = "Convert images, audio, video and documents through a remote conversion service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the conversion service.
    #[arg(
        long,
        global = true,
        env = "MEDIACONV_SERVER",
        default_value = "http://localhost:8080"
    )]
    server: String,

    /// Request timeout in seconds. No timeout when unset.
    #[arg(long, global = true, env = "MEDIACONV_TIMEOUT")]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MEDIACONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MEDIACONV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a file and save the result.
    Convert(ConvertArgs),
    /// Show the local preview a file would get.
    Preview(PreviewArgs),
    /// List categories and the formats they offer.
    Formats {
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// File to convert.
    input: PathBuf,

    /// Output format. Defaults to the category's first offered format.
    #[arg(long = "to", short = 't')]
    format: Option<String>,

    /// Media category: image, audio, video or document. Detected from the
    /// file when omitted.
    #[arg(long)]
    category: Option<ConversionCategory>,

    /// Directory to save the converted file into.
    #[arg(short, long, env = "MEDIACONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Send the format even if the category does not offer it.
    #[arg(long)]
    no_format_check: bool,

    /// Print a JSON summary instead of the saved path.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// File to preview.
    input: PathBuf,

    /// Media category: image, audio, video or document. Detected from the
    /// file when omitted.
    #[arg(long)]
    category: Option<ConversionCategory>,

    /// Output the preview state as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and alerts cover normal feedback; library logs stay at
    // WARN unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Convert(args) => run_convert(&cli, args).await,
        Command::Preview(args) => run_preview(args).await,
        Command::Formats { json } => print_formats(*json),
    }
}

async fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    let file = SelectedFile::from_path(&args.input)
        .await
        .with_context(|| format!("Failed to open {:?}", args.input))?;
    let category = resolve_category(args.category, &file)?;
    let format = args
        .format
        .clone()
        .unwrap_or_else(|| category.default_format().to_string());

    let mut builder = ClientConfig::builder()
        .base_url(&cli.server)
        .enforce_offered_formats(!args.no_format_check);
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if !cli.quiet {
        let show_spinner = !cli.verbose && !args.json;
        builder = builder.observer(CliObserver::new(show_spinner));
    }
    let config = builder.build().context("Invalid configuration")?;

    let sink = Arc::new(DirectorySink::new(&args.output_dir));
    let forms = ConversionForms::new(config, sink.clone()).context("Failed to create client")?;
    let form = forms.form(category);

    form.select(Some(file));
    let converted = form.submit(&format).await.context("Conversion failed")?;

    let Some(path) = sink.saved_paths().pop() else {
        bail!(
            "Converted '{}' but could not save it into {:?}",
            converted.filename,
            args.output_dir
        );
    };

    if args.json {
        let summary = serde_json::json!({
            "category": category,
            "format": format,
            "filename": converted.filename,
            "size": converted.size,
            "path": path,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

async fn run_preview(args: &PreviewArgs) -> Result<()> {
    let file = SelectedFile::from_path(&args.input)
        .await
        .with_context(|| format!("Failed to open {:?}", args.input))?;
    let category = resolve_category(args.category, &file)?;

    let store = ObjectUrlStore::new();
    let mut slot = PreviewRenderer::new(category, store);
    let state = slot.render(Some(&file));

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&state).context("Failed to serialise preview")?
        );
        return Ok(());
    }

    println!("File:      {}", file.name());
    println!("Category:  {}", category);
    println!("Type:      {}", file.media_type());
    println!("Size:      {} bytes", file.size());
    match (&state.element, &state.source) {
        (Some(element), Some(source)) if state.visible => {
            println!("Preview:   {:?}", element);
            println!("Source:    {}", abbreviate(source, 72));
        }
        _ => println!("Preview:   {}", dim("No preview available")),
    }
    Ok(())
}

fn print_formats(json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = ConversionCategory::ALL
            .iter()
            .map(|c| {
                serde_json::json!({
                    "category": c,
                    "endpoint": c.endpoint(),
                    "max_size": c.max_size(),
                    "formats": c.offered_formats(),
                    "preview": c.preview_strategy(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialise formats")?
        );
        return Ok(());
    }

    println!("{}", table_header());
    for c in ConversionCategory::ALL {
        println!("{}", table_row(c));
    }
    Ok(())
}

// Pad before styling: escape codes must not count toward column widths.
fn table_header() -> String {
    format!(
        "{} {} {}  {}",
        bold(&format!("{:<10}", "Category")),
        bold(&format!("{:<24}", "Endpoint")),
        bold(&format!("{:>9}", "Limit")),
        bold("Formats")
    )
}

fn table_row(c: ConversionCategory) -> String {
    let limit = c
        .max_size()
        .map(|b| format!("{} MiB", b / (1024 * 1024)))
        .unwrap_or_else(|| "none".to_string());
    format!(
        "{:<10} {:<24} {:>9}  {}",
        c.name(),
        c.endpoint(),
        limit,
        c.offered_formats().join(", ")
    )
}

fn resolve_category(
    arg: Option<ConversionCategory>,
    file: &SelectedFile,
) -> Result<ConversionCategory> {
    if let Some(c) = arg {
        return Ok(c);
    }
    match ConversionCategory::detect(file) {
        Some(c) => Ok(c),
        None => bail!(
            "Cannot tell the category of '{}' ({}). Pass --category image|audio|video|document.",
            file.name(),
            file.media_type()
        ),
    }
}

fn abbreviate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}
