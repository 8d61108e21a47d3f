use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use walkdir::WalkDir;

use substrat_core::handlers::{Concat, Emit, Template};
use substrat_core::impls::{GlobPattern, MemoryMapper};
use substrat_core::{BuildOptions, Handler, Task, TaskConfig};

/// Run one build task over a source tree.
#[derive(Debug, Parser)]
#[command(name = "substrat", version, about)]
struct Cli {
    /// Bundled handler to run
    #[arg(value_enum)]
    handler: HandlerKind,

    /// Source root (overrides the options file)
    #[arg(long)]
    src: Option<PathBuf>,

    /// Destination root (overrides the options file)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// JSON file with build options
    #[arg(long = "options")]
    options_file: Option<PathBuf>,

    /// Only files matching one of these globs are handed to the task
    #[arg(long = "pattern")]
    patterns: Vec<String>,

    /// Virtual output file (concat, emit)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Static task data as JSON
    #[arg(long)]
    data: Option<String>,

    /// Custom template delimiters
    #[arg(long, num_args = 2, value_names = ["OPEN", "CLOSE"])]
    tags: Option<Vec<String>>,

    /// Maximum number of concurrent writes
    #[arg(long)]
    write_concurrency: Option<usize>,

    /// Suppress task log lines
    #[arg(long)]
    silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HandlerKind {
    Template,
    Concat,
    Emit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let options = build_options(&cli)?;
    let task = build_task(&cli)?;

    // Pattern filtering is the orchestrator's job; the task never filters.
    let mut files = collect_files(&options.src)?;
    if !cli.patterns.is_empty() {
        files = GlobPattern::new(&cli.patterns)?.filter(&files);
    }
    if !task.matches(&files) {
        info!(task = task.name(), "no matching files, skipped");
        return Ok(());
    }

    let mapper = MemoryMapper::new();
    task.run(None, &mapper, &options, &files, cli.silent).await;

    for (source, mapped) in mapper.entries() {
        debug!(source = %source.display(), ?mapped, "mapped");
    }
    for mapped in mapper.virtuals() {
        debug!(?mapped, "virtual");
    }
    Ok(())
}

fn build_options(cli: &Cli) -> Result<BuildOptions> {
    let mut options = match &cli.options_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            BuildOptions::from_json(&json)?
        }
        None => BuildOptions::new(".", "build"),
    };
    if let Some(src) = &cli.src {
        options.src = src.clone();
    }
    if let Some(dest) = &cli.dest {
        options.dest = dest.clone();
    }
    if let Some(limit) = cli.write_concurrency {
        options = options.with_write_concurrency(limit)?;
    }
    Ok(options)
}

fn build_task(cli: &Cli) -> Result<Task> {
    let mut config = TaskConfig::new();
    if let Some(data) = &cli.data {
        config.data = serde_json::from_str(data).context("--data is not valid JSON")?;
    }
    if let Some(file) = &cli.file {
        config.file = Some(file.clone());
    }
    if let Some([open, close]) = cli.tags.as_deref() {
        config = config.with_tags(open.as_str(), close.as_str())?;
    }

    let (name, handler) = match cli.handler {
        HandlerKind::Template => ("Template", Handler::each(Template::new())),
        HandlerKind::Concat => ("Concat", Handler::all(Concat)),
        HandlerKind::Emit => ("Emit", Handler::single(Emit)),
    };
    let task = Task::new(name, handler, config);
    if cli.patterns.is_empty() {
        Ok(task)
    } else {
        Ok(task.with_pattern(GlobPattern::new(&cli.patterns)?))
    }
}

/// Every regular file below `root`, relative to it and sorted.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        files.push(relative.to_path_buf());
    }
    files.sort();
    Ok(files)
}
