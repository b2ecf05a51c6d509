//! blockdoc CLI - document-analysis reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use blockdoc::job::{
    DirectoryResultSource, DirectorySink, FileRecordStore, JobConfig, JobProcessor, RetryPolicy,
    DEFAULT_TABLE,
};
use blockdoc::render::ExtractionStats;
use blockdoc::{
    detect_format_from_path, parse_file_with_options, AnalysisParser, CleanupPreset, JsonFormat,
    KeyValuePolicy, PageSelection, ParseOptions, RenderOptions,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "blockdoc")]
#[command(version)]
#[command(
    about = "Reconstruct document-analysis output into Markdown, text, and JSON",
    long_about = None
)]
struct Cli {
    /// Input analysis output file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Text cleanup preset
    #[arg(long, value_enum)]
    cleanup: Option<CleanupLevel>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert analysis output to all formats (Markdown, text, JSON)
    Convert {
        /// Input analysis output files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "BLOCKDOC_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Key/value policy
        #[arg(long, value_enum, default_value = "plain", env = "BLOCKDOC_KV_POLICY")]
        policy: Policy,
    },

    /// Convert analysis output to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input analysis output file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// Leave out key/value bullets
        #[arg(long)]
        no_key_values: bool,

        /// Leave out tables
        #[arg(long)]
        no_tables: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Key/value policy
        #[arg(long, value_enum, default_value = "plain", env = "BLOCKDOC_KV_POLICY")]
        policy: Policy,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert analysis output to plain text
    Text {
        /// Input analysis output file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Key/value policy
        #[arg(long, value_enum, default_value = "plain", env = "BLOCKDOC_KV_POLICY")]
        policy: Policy,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert analysis output to the per-page JSON list
    Json {
        /// Input analysis output file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Wrap the pages in a document object with metadata
        #[arg(long)]
        with_metadata: bool,

        /// Key/value policy
        #[arg(long, value_enum, default_value = "plain", env = "BLOCKDOC_KV_POLICY")]
        policy: Policy,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show document information
    Info {
        /// Input analysis output file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Process a job-completion notification event
    Process {
        /// Notification event file
        #[arg(value_name = "EVENT")]
        event: PathBuf,

        /// Directory holding saved job results
        #[arg(long, value_name = "DIR", env = "BLOCKDOC_RESULTS_DIR")]
        results: PathBuf,

        /// Directory the reconstructed JSON is written below
        #[arg(short, long, value_name = "DIR", env = "BLOCKDOC_OUTPUT_DIR")]
        output: PathBuf,

        /// Directory records are stored in
        #[arg(long, value_name = "DIR", env = "BLOCKDOC_RECORDS_DIR")]
        records: PathBuf,

        /// Record table name
        #[arg(long, default_value = DEFAULT_TABLE, env = "BLOCKDOC_TABLE")]
        table: String,

        /// Attempts per collaborator call
        #[arg(long, default_value = "4", env = "BLOCKDOC_MAX_ATTEMPTS")]
        max_attempts: u32,

        /// Key/value policy
        #[arg(long, value_enum, default_value = "plain", env = "BLOCKDOC_KV_POLICY")]
        policy: Policy,

        /// Print outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (for LLM training)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Attach every pair whose value falls in the band
    Plain,
    /// Drop pairs whose value sits inside a table in the band
    ExcludeInTables,
}

impl From<Policy> for KeyValuePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Plain => KeyValuePolicy::Plain,
            Policy::ExcludeInTables => KeyValuePolicy::ExcludeInTables,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            cleanup,
            policy,
        }) => cmd_convert(&inputs, output.as_deref(), cleanup, policy),
        Some(Commands::Markdown {
            input,
            output,
            frontmatter,
            no_key_values,
            no_tables,
            cleanup,
            policy,
            pages,
        }) => cmd_markdown(
            &input,
            output.as_deref(),
            frontmatter,
            !no_key_values,
            !no_tables,
            cleanup,
            policy,
            pages.as_deref(),
        ),
        Some(Commands::Text {
            input,
            output,
            cleanup,
            policy,
            pages,
        }) => cmd_text(&input, output.as_deref(), cleanup, policy, pages.as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
            with_metadata,
            policy,
            pages,
        }) => cmd_json(
            &input,
            output.as_deref(),
            compact,
            with_metadata,
            policy,
            pages.as_deref(),
        ),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Process {
            event,
            results,
            output,
            records,
            table,
            max_attempts,
            policy,
            json,
        }) => cmd_process(
            &event,
            &results,
            &output,
            &records,
            &table,
            max_attempts,
            policy,
            json,
        ),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&[input], cli.output.as_deref(), cli.cleanup, Policy::Plain)
            } else {
                println!("{}", "Usage: blockdoc <FILE> [OUTPUT]".yellow());
                println!("       blockdoc --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn page_selection(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match pages {
        Some(p) => Ok(PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?),
        None => Ok(PageSelection::All),
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    policy: Policy,
) -> CliResult {
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut render_options = RenderOptions::new().with_frontmatter(true);
    if let Some(level) = cleanup {
        render_options = render_options.with_cleanup_preset(level.into());
    }

    let mut written = Vec::new();
    let mut failed = 0usize;

    for input in inputs {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        pb.set_message(stem.to_string());

        let output_dir = match output {
            Some(root) if inputs.len() > 1 => root.join(format!("{}_output", stem)),
            Some(root) => root.to_path_buf(),
            None => PathBuf::from(format!("{}_output", stem)),
        };
        log::debug!(
            "Converting {} into {}",
            input.display(),
            output_dir.display()
        );

        // Lenient so one broken page does not lose the rest of the file
        let options = ParseOptions::new()
            .lenient()
            .with_key_value_policy(policy.into());

        let result = parse_file_with_options(input, options).and_then(|doc| {
            fs::create_dir_all(&output_dir)?;

            let markdown = blockdoc::render::to_markdown(&doc, &render_options)?;
            fs::write(output_dir.join("extract.md"), &markdown)?;

            let text = blockdoc::render::to_text(&doc, &render_options)?;
            fs::write(output_dir.join("extract.txt"), &text)?;

            let json = blockdoc::render::pages_to_json(&doc.pages, JsonFormat::Pretty)?;
            fs::write(output_dir.join("pages.json"), &json)?;
            Ok(())
        });

        match result {
            Ok(()) => written.push(output_dir),
            Err(e) => {
                log::warn!("Conversion of {} failed: {}", input.display(), e);
                failed += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    for dir in &written {
        println!("  {}/", dir.display());
        println!("  {} extract.md", "├─".dimmed());
        println!("  {} extract.txt", "├─".dimmed());
        println!("  {} pages.json", "└─".dimmed());
    }

    if failed > 0 {
        return Err(format!("{} of {} inputs failed", failed, inputs.len()).into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    frontmatter: bool,
    key_values: bool,
    tables: bool,
    cleanup: Option<CleanupLevel>,
    policy: Policy,
    pages: Option<&str>,
) -> CliResult {
    let selection = page_selection(pages)?;

    let options = ParseOptions::new()
        .lenient()
        .with_key_value_policy(policy.into())
        .with_pages(selection.clone());
    let doc = parse_file_with_options(input, options)?;

    let mut render_options = RenderOptions::new()
        .with_frontmatter(frontmatter)
        .with_key_values(key_values)
        .with_tables(tables)
        .with_pages(selection);

    if let Some(level) = cleanup {
        render_options = render_options.with_cleanup_preset(level.into());
    }

    let markdown = blockdoc::render::to_markdown(&doc, &render_options)?;
    write_or_print(output, &markdown)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    policy: Policy,
    pages: Option<&str>,
) -> CliResult {
    let selection = page_selection(pages)?;

    let options = ParseOptions::new()
        .lenient()
        .with_key_value_policy(policy.into())
        .with_pages(selection);
    let doc = parse_file_with_options(input, options)?;

    let mut render_options = RenderOptions::new();
    if let Some(level) = cleanup {
        render_options = render_options.with_cleanup_preset(level.into());
    }

    let text = blockdoc::render::to_text(&doc, &render_options)?;
    write_or_print(output, &text)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    with_metadata: bool,
    policy: Policy,
    pages: Option<&str>,
) -> CliResult {
    // Strict: JSON output is the machine-facing format, so a broken page fails the run
    let options = ParseOptions::new()
        .with_key_value_policy(policy.into())
        .with_pages(page_selection(pages)?);
    let doc = parse_file_with_options(input, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = if with_metadata {
        blockdoc::render::to_json(&doc, format)?
    } else {
        blockdoc::render::pages_to_json(&doc.pages, format)?
    };

    write_or_print(output, &json)
}

fn cmd_info(input: &Path) -> CliResult {
    let format = detect_format_from_path(input)?;
    if !format.has_blocks() {
        let message = format!("{} carries no blocks; use `blockdoc process`", format);
        return Err(message.into());
    }
    let parser = AnalysisParser::open_with_options(input, ParseOptions::new().lenient())?;
    let metadata = parser.metadata();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    println!("{}: {}", "Blocks".bold(), metadata.block_count);

    if let Some(ref version) = metadata.model_version {
        println!("{}: {}", "Model version".bold(), version);
    }
    if let Some(ref status) = metadata.job_status {
        println!("{}: {}", "Job status".bold(), status);
    }

    println!();
    println!("{}", "Block Types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (kind, count) in parser.result().block_counts() {
        println!("{}: {}", kind.bold(), count);
    }

    let doc = parser.parse()?;
    let mut stats = ExtractionStats::new();
    for page in &doc.pages {
        stats.merge(&ExtractionStats::from_page(page));
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Lines".bold(), stats.line_count);
    println!("{}: {}", "Key/value pairs".bold(), stats.key_value_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    let skipped = metadata.page_count.saturating_sub(doc.page_count());
    if skipped > 0 {
        println!("{}: {}", "Skipped pages".yellow().bold(), skipped);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_process(
    event: &Path,
    results: &Path,
    output: &Path,
    records: &Path,
    table: &str,
    max_attempts: u32,
    policy: Policy,
    json: bool,
) -> CliResult {
    log::info!(
        "Processing event {} against results in {}",
        event.display(),
        results.display()
    );
    let event = fs::read_to_string(event)?;

    let config = JobConfig::new()
        .with_table(table)
        .with_retry(RetryPolicy::new().with_max_attempts(max_attempts))
        .with_parse_options(ParseOptions::new().with_key_value_policy(policy.into()));

    let processor = JobProcessor::with_config(
        DirectoryResultSource::new(results),
        DirectorySink::new(output),
        FileRecordStore::new(records),
        config,
    );

    let outcomes = processor.process_event(&event)?;
    log::debug!("Event produced {} job outcomes", outcomes.len());

    if json {
        let summary: Vec<_> = outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "job_id": o.job_id,
                    "output_key": o.output_key,
                    "page_count": o.page_count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for outcome in &outcomes {
        println!(
            "{} {} ({} pages) -> {}",
            "Processed".green(),
            outcome.job_id,
            outcome.page_count,
            output.join(&outcome.output_key).display()
        );
    }
    println!(
        "\n{} {} jobs processed",
        "Done!".green().bold(),
        outcomes.len()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "blockdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document-analysis reconstruction tool");
    println!();
    println!("License: MIT");
}
