//! CLI binary for md2doc.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use md2doc::buildfs_hook::{self, BuildContext, BuildHooks, BUILDFS_TARGET};
use md2doc::config::DEFAULT_RENDERER_URL;
use md2doc::pipeline::input::resolve_input;
use md2doc::{
    convert, ConversionConfig, ConversionProgressCallback, ConversionReport, ProgressCallback,
    Variant,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner plus one log line per rendered diagram.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading Markdown…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Clear the spinner when the run fails before `on_conversion_complete`.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, input: &Path, variant: Variant) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!(
            "{} → {}",
            input.display(),
            variant.output_file_name()
        ));
    }

    fn on_diagram_start(&self, index: usize) {
        self.bar.set_message(format!("rendering diagram {index}"));
    }

    fn on_diagram_complete(&self, index: usize, width_px: u32, height_px: u32) {
        self.bar.println(format!(
            "  {} Diagram {:>3}  {}",
            green("✓"),
            index,
            dim(&format!("{width_px}x{height_px}px")),
        ));
    }

    fn on_diagram_error(&self, index: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Diagram {:>3}  {}  {}",
            red("✗"),
            index,
            red(&msg),
            dim("(placeholder used)"),
        ));
    }

    fn on_conversion_complete(&self, _output: &Path) {
        self.bar.finish_and_clear();
        let errors = self.errors.load(Ordering::SeqCst);
        if errors > 0 {
            eprintln!(
                "{} {} diagram(s) replaced by a placeholder",
                cyan("⚠"),
                bold(&errors.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plain Word document from ./document.md
  md2doc docx

  # Word document with rendered Mermaid diagrams
  md2doc diagrams notes.md

  # Word document with real tables, diagrams as placeholders
  md2doc tables --title "Flight controller" notes.md

  # LaTeX source (compile with xelatex)
  md2doc latex notes.md

  # Self-hosted renderer
  md2doc diagrams --renderer-url http://localhost:3000/img/ notes.md

  # Prepare the firmware filesystem image's data directory
  md2doc buildfs --project-dir ./firmware

OUTPUT FILES (always written to the current directory):
  docx      document.docx
  diagrams  document_diagrams.docx
  tables    document_tables.docx
  latex     document.tex

ENVIRONMENT VARIABLES:
  MD2DOC_RENDERER_URL     Diagram renderer base URL (default https://mermaid.ink/img/)
  MD2DOC_RENDER_TIMEOUT   Per-diagram HTTP timeout in seconds
  PROJECT_DIR             Project root for `buildfs`
  RUST_LOG                Override the log filter
"#;

/// Convert Markdown documents to Word or LaTeX.
#[derive(Parser, Debug)]
#[command(
    name = "md2doc",
    version,
    about = "Convert Markdown documents to Word (.docx) or LaTeX",
    long_about = "Convert a Markdown file to a Word document or LaTeX source. Headings, \
paragraphs, pipe tables, fenced code and Mermaid diagrams are recognised; the `diagrams` \
variant renders Mermaid blocks to images through a mermaid.ink-compatible service.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MD2DOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MD2DOC_QUIET")]
    quiet: bool,

    /// Print the conversion report as JSON.
    #[arg(long, global = true, env = "MD2DOC_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "MD2DOC_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plain Word document: every block becomes a paragraph (document.docx).
    Docx(ConvertArgs),
    /// Word document with diagrams rendered to images (document_diagrams.docx).
    Diagrams(ConvertArgs),
    /// Word document with real tables and diagram placeholders (document_tables.docx).
    Tables(ConvertArgs),
    /// LaTeX source (document.tex).
    Latex(ConvertArgs),
    /// Ensure the firmware filesystem image's data directory exists.
    Buildfs(BuildfsArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Markdown source file (default: document.md).
    input: Option<PathBuf>,

    /// Document title (default: input file stem).
    #[arg(long, env = "MD2DOC_TITLE")]
    title: Option<String>,

    /// Diagram renderer base URL; the base64 diagram source is appended.
    #[arg(long, env = "MD2DOC_RENDERER_URL", default_value = DEFAULT_RENDERER_URL)]
    renderer_url: String,

    /// Per-diagram HTTP timeout in seconds.
    #[arg(long, env = "MD2DOC_RENDER_TIMEOUT", default_value_t = 60)]
    render_timeout: u64,

    /// Width of rendered diagrams in inches.
    #[arg(long, env = "MD2DOC_IMAGE_WIDTH", default_value_t = 6.0)]
    image_width: f32,

    /// Fence languages treated as diagrams (comma-separated).
    #[arg(
        long = "diagram-lang",
        env = "MD2DOC_DIAGRAM_LANGS",
        value_delimiter = ',',
        default_value = "mermaid"
    )]
    diagram_languages: Vec<String>,
}

#[derive(Args, Debug)]
struct BuildfsArgs {
    /// Project root (default: $PROJECT_DIR, then the current directory).
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters, so INFO logs are
    // suppressed while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let (variant, args) = match cli.command {
        Command::Docx(ref args) => (Variant::Docx, args),
        Command::Diagrams(ref args) => (Variant::Diagrams, args),
        Command::Tables(ref args) => (Variant::Tables, args),
        Command::Latex(ref args) => (Variant::Latex, args),
        Command::Buildfs(ref args) => return run_buildfs(args, cli.quiet),
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        args,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Run conversion ───────────────────────────────────────────────────
    let input = resolve_input(args.input.as_deref());
    let result = convert(&input, variant, &config).await;
    if let Some(ref cb) = progress {
        cb.abandon();
    }
    let report = result.with_context(|| {
        format!("Failed to convert {} ({variant})", input.display())
    })?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(args: &ConvertArgs, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .renderer_url(args.renderer_url.clone())
        .render_timeout_secs(args.render_timeout)
        .image_width_inches(args.image_width)
        .diagram_languages(&args.diagram_languages);

    if let Some(ref title) = args.title {
        builder = builder.title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &ConversionReport) {
    println!(
        "Converted {} -> {}",
        report.input.display(),
        report.output.display()
    );
    let mut detail = format!(
        "{} blocks in {}ms",
        report.blocks.total(),
        report.duration_ms
    );
    if report.blocks.diagrams > 0 {
        detail.push_str(&format!(
            ", diagrams: {} rendered / {} placeholder",
            report.diagrams_rendered, report.diagrams_placeholder
        ));
    }
    eprintln!("   {}", dim(&detail));
}

/// `buildfs` pre-build step: run every pre-action registered for the target.
fn run_buildfs(args: &BuildfsArgs, quiet: bool) -> Result<()> {
    let project_dir = buildfs_hook::resolve_project_dir(args.project_dir.as_deref())
        .context("Failed to resolve project directory")?;

    let mut hooks = BuildHooks::new();
    buildfs_hook::register(&mut hooks);

    let ctx = BuildContext::new(project_dir);
    let lines = hooks
        .run_pre_actions(BUILDFS_TARGET, &ctx)
        .with_context(|| format!("{BUILDFS_TARGET} pre-build step failed"))?;

    if !quiet {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
