//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use trainforge_core::pipeline::{
    self, GenerateConfig, GenerationResult, ProgressReporter,
};
use trainforge_core::{assembler, group_hits};
use trainforge_ingest::{DocumentIngestor, NoiseFilter};
use trainforge_shared::{
    AppConfig, DocumentId, LearningLevel, OutputFormat, expand_home, init_config, load_config,
};
use trainforge_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Trainforge: build training modules from your own documents.
#[derive(Parser)]
#[command(
    name = "trainforge",
    version,
    about = "Ingest documents and generate structured training modules from them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Store directory (overrides `storage.store_dir`).
    #[arg(long, env = "TRAINFORGE_STORE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest documents (.txt, .md, .csv, .pdf, .docx, .xlsx) into the store.
    Ingest {
        /// Files to ingest.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Generate a training module from stored documents.
    Generate {
        /// Request, e.g. "Create a 15 minute module on adult learning principles".
        prompt: String,

        /// Module length in minutes.
        #[arg(short, long)]
        duration: Option<u32>,

        /// Learner level: beginner, intermediate or advanced.
        #[arg(short, long)]
        level: Option<LearningLevel>,

        /// Output: ppt (slides), pdf (manual) or both.
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Module topic (skips extraction from the prompt).
        #[arg(short, long)]
        topic: Option<String>,

        /// Output directory (defaults to `storage.outputs_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show grouped retrieval results for a query.
    Search {
        query: String,

        /// Maximum chunk hits.
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// List stored documents.
    List,

    /// Show one stored document and its chunks.
    Show {
        /// Document ID as shown by `list`.
        id: String,

        /// Print full chunk text instead of a preview.
        #[arg(long)]
        full: bool,
    },

    /// List generated modules, newest first.
    Outputs {
        /// Output directory (defaults to `storage.outputs_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove a document and its chunks.
    Delete {
        /// Document ID as shown by `list`.
        id: String,
    },

    /// Document and chunk counts.
    Stats,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "trainforge=info",
        1 => "trainforge=debug",
        _ => "trainforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest { files } => cmd_ingest(cli.store.as_deref(), &files).await,
        Command::Generate {
            prompt,
            duration,
            level,
            format,
            topic,
            out,
            json,
        } => {
            let request = GenerateArgs {
                prompt,
                duration,
                level,
                format,
                topic,
                out,
                json,
            };
            cmd_generate(cli.store.as_deref(), request).await
        }
        Command::Search { query, limit } => cmd_search(cli.store.as_deref(), &query, limit).await,
        Command::List => cmd_list(cli.store.as_deref()).await,
        Command::Show { id, full } => cmd_show(cli.store.as_deref(), &id, full).await,
        Command::Outputs { out } => cmd_outputs(out),
        Command::Delete { id } => cmd_delete(cli.store.as_deref(), &id).await,
        Command::Stats => cmd_stats(cli.store.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Resolve the store directory: `--store` flag, then config.
fn store_dir(flag: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    match flag {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(expand_home(&config.storage.store_dir)?),
    }
}

async fn open_store(flag: Option<&Path>, config: &AppConfig) -> Result<Storage> {
    let dir = store_dir(flag, config)?;
    info!(store = %dir.display(), "opening store");
    Ok(Storage::open_dir(&dir).await?)
}

fn noise_filter(config: &AppConfig) -> NoiseFilter {
    NoiseFilter::with_extra(&config.noise.extra_signatures)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(store: Option<&Path>, files: &[PathBuf]) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;
    let ingestor = DocumentIngestor::new(&config.chunking, noise_filter(&config))?;

    let reporter = CliProgress::new()?;
    let summary = pipeline::ingest_files(&storage, &ingestor, files, &reporter).await;

    println!();
    for doc in &summary.ingested {
        println!(
            "  ✓ {}  {}  ({} chunks)",
            doc.id, doc.filename, doc.chunk_count
        );
    }
    for (path, error) in &summary.failed {
        println!("  ✗ {}: {error}", path.display());
    }
    println!();

    if summary.ingested.is_empty() {
        return Err(eyre!("no documents were ingested"));
    }
    Ok(())
}

/// Flags of the `generate` subcommand.
struct GenerateArgs {
    prompt: String,
    duration: Option<u32>,
    level: Option<LearningLevel>,
    format: Option<OutputFormat>,
    topic: Option<String>,
    out: Option<PathBuf>,
    json: bool,
}

async fn cmd_generate(store: Option<&Path>, args: GenerateArgs) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;
    let noise = noise_filter(&config);

    let output_root = match args.out {
        Some(p) => p,
        None => expand_home(&config.storage.outputs_dir)?,
    };

    let generate_config = GenerateConfig {
        prompt: args.prompt,
        topic: args.topic,
        duration_minutes: args.duration.unwrap_or(config.generation.default_duration),
        level: args.level.unwrap_or(config.generation.default_level),
        format: args.format.unwrap_or(config.generation.default_format),
        output_root,
        max_search_results: config.generation.max_search_results,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    info!(
        minutes = generate_config.duration_minutes,
        level = %generate_config.level,
        "generating module"
    );

    let result = if args.json {
        pipeline::generate_module(&storage, &noise, &generate_config, &pipeline::SilentProgress)
            .await
    } else {
        let reporter = CliProgress::new()?;
        pipeline::generate_module(&storage, &noise, &generate_config, &reporter).await
    };
    let report = GenerationResult::from_result(&result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let outcome = result?;
    let meta = &outcome.module.metadata;

    println!();
    println!("  Training module generated!");
    println!("  Title:      {}", meta.title);
    println!("  Level:      {}", meta.learning_level);
    println!("  Duration:   {} minutes", meta.duration_minutes);
    println!("  Focus:      {}", meta.focus_topics.join(", "));
    println!("  Sources:    {}", meta.source_documents.join(", "));
    println!("  Artifacts:  {}", outcome.artifacts.join(", "));
    println!("  Path:       {}", outcome.module_dir.display());
    println!("  Time:       {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_search(store: Option<&Path>, query: &str, limit: u32) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;

    let groups = group_hits(storage.search_chunks(query, limit).await?);
    if groups.is_empty() {
        println!("No matching chunks.");
        return Ok(());
    }

    for group in &groups {
        println!(
            "{}  {} ({})  best match {:.2}",
            group.document_id, group.filename, group.file_type, group.max_similarity
        );
        for chunk in &group.chunks {
            let preview: String = chunk.text.chars().take(100).collect();
            println!("    [{:>3}] {:.2}  {preview}", chunk.index, chunk.similarity);
        }
    }
    Ok(())
}

async fn cmd_list(store: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;

    let docs = storage.list_documents().await?;
    if docs.is_empty() {
        println!("No documents ingested yet.");
        return Ok(());
    }

    println!("{:<12}  {:<6}  {:>6}  {:<20}  FILENAME", "ID", "TYPE", "CHUNKS", "INGESTED");
    for doc in docs {
        println!(
            "{:<12}  {:<6}  {:>6}  {:<20}  {}",
            doc.id,
            doc.file_type,
            doc.chunk_count,
            doc.ingested_at.format("%Y-%m-%d %H:%M"),
            doc.filename
        );
    }
    Ok(())
}

async fn cmd_show(store: Option<&Path>, id: &str, full: bool) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;

    let id = DocumentId(id.trim().to_string());
    let Some(doc) = storage.get_document(&id).await? else {
        return Err(eyre!("no document with id '{id}'"));
    };

    println!("ID:        {}", doc.id);
    println!("File:      {} ({})", doc.filename, doc.file_type);
    println!("Size:      {} bytes, {} chars cleaned", doc.file_size, doc.content_length);
    println!("SHA-256:   {}", doc.content_hash);
    println!("Ingested:  {}", doc.ingested_at.format("%Y-%m-%d %H:%M"));
    println!("Chunks:    {}", doc.chunk_count);

    for (index, text) in storage.document_chunks(&id).await?.iter().enumerate() {
        if full {
            println!("\n[{index:>3}] {text}");
        } else {
            let preview: String = text.chars().take(100).collect();
            println!("  [{index:>3}] {preview}");
        }
    }
    Ok(())
}

fn cmd_outputs(out: Option<PathBuf>) -> Result<()> {
    let output_root = match out {
        Some(p) => p,
        None => expand_home(&load_config()?.storage.outputs_dir)?,
    };

    let modules = assembler::list_modules(&output_root)?;
    if modules.is_empty() {
        println!("No modules in {}", output_root.display());
        return Ok(());
    }

    println!("{:<16}  {:>4}  {:<12}  {:<8}  MODULE", "CREATED", "MIN", "LEVEL", "STATUS");
    for listing in modules {
        let manifest = &listing.manifest;
        let files: Vec<&str> = manifest.artifacts.iter().map(|a| a.filename.as_str()).collect();
        println!(
            "{:<16}  {:>4}  {:<12}  {:<8}  {}",
            manifest.created_at.format("%Y-%m-%d %H:%M"),
            manifest.duration_minutes,
            manifest.learning_level.to_string(),
            if listing.verified { "ok" } else { "modified" },
            manifest.title
        );
        println!("{:>48}{} [{}]", "", listing.module_dir.display(), files.join(", "));
    }
    Ok(())
}

async fn cmd_delete(store: Option<&Path>, id: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;

    let id = DocumentId(id.trim().to_string());
    if !storage.delete_document(&id).await? {
        return Err(eyre!("no document with id '{id}'"));
    }
    println!("Deleted document {id}");
    Ok(())
}

async fn cmd_stats(store: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let storage = open_store(store, &config).await?;

    let stats = storage.stats().await?;
    println!("Documents: {}", stats.documents);
    println!("Chunks:    {}", stats.chunks);
    for (file_type, count) in &stats.by_file_type {
        println!("  {file_type:<6} {count}");
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_ingested(&self, filename: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Ingested [{current}/{total}] {filename}"));
    }

    fn done(&self, _summary: &str) {
        self.spinner.finish_and_clear();
    }
}
