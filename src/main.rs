//! CLI entry point for the keyed vector pipelines.
//!
//! Each pipeline subcommand opens its archives from locator strings, runs the
//! library pipeline, reports the summary on stderr and exits with the code
//! the summary (or the fatal error) maps to.

use anyhow::{Context, anyhow};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;
use std::time::Instant;
use vecpipe::archive::{
    ArchiveValue, ArchiveWriter, GroupReader, MatrixWriter, RandomAccessVectorReader,
    SequentialReader, VectorReader, VectorWriter, WriterOptions,
};
use vecpipe::io::{ExitCode, OutputFormat, OutputManager};
use vecpipe::pipeline::{
    ConcatSummary, CopySummary, RunSummary, SimilarityOptions, SimilaritySummary,
    append_vectors, compute_dot_products_dense, copy_records,
};
use vecpipe::vector::{Matrix, Vector};
use vecpipe::{PipelineResult, Settings, logging};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const LOCATOR_HELP: &str = "Locators:\n  ark:path      binary archive (write), any format (read)\n  ark,t:path    text archive\n  ark,b,f:path  binary, flushed after every record\n  path          bare path, text unless archive.binary_by_default is set\n  scp:path      script of `key archive:offset` lines (vector store only)\n  -             stdin / stdout";

/// Keyed vector archive pipelines
#[derive(Parser)]
#[command(
    name = "vecpipe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Join keyed vector archives",
    long_about = "Concatenate aligned vector archives and score vectors within groups.",
    styles = clap_cargo_style(),
    after_help = LOCATOR_HELP
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true, env = "VP_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug detail for every record
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Append the vectors of a second archive to those of a first
    #[command(
        about = "Concatenate vectors from two archives key by key",
        after_help = "Both inputs must hold the same keys in the same order.\n\nExample:\n  vecpipe append-vectors ark:a.ark ark:b.ark ark:ab.ark"
    )]
    AppendVectors {
        /// First input archive
        first: String,
        /// Second input archive
        second: String,
        /// Output archive
        output: String,
    },

    /// Score every pair of vectors inside each group
    #[command(
        about = "Write an N x N dot-product matrix per group",
        after_help = "Groups are token lists: `group member1 member2 ...`.\n\nExample:\n  vecpipe dot-products-dense ark,t:groups.txt ark:vectors.ark ark:scores.ark"
    )]
    DotProductsDense {
        /// L2-normalize vectors first (cosine similarity)
        #[arg(long)]
        normalize: bool,
        /// Group archive (token lists)
        groups: String,
        /// Vector archive or scp: script, read by random access
        vectors: String,
        /// Output archive of score matrices
        output: String,
    },

    /// Re-encode an archive
    #[command(
        about = "Copy an archive, converting between text and binary",
        after_help = "Example:\n  vecpipe copy ark:vectors.ark ark,t:-"
    )]
    Copy {
        /// Records are matrices instead of vectors
        #[arg(long)]
        matrix: bool,
        /// Input archive
        input: String,
        /// Output archive
        output: String,
    },

    /// Initialize project
    #[command(about = "Set up .vecpipe directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            std::process::exit(ExitCode::ConfigError.into());
        }
    };

    logging::init(logging::resolve_level(
        cli.verbose,
        cli.quiet,
        &settings.logging.level,
    ));

    let mut output = OutputManager::new(OutputFormat::from_json_flag(cli.json));
    let writer_options = settings.archive.writer_options();
    let started = Instant::now();

    let exit_code = match &cli.command {
        Commands::AppendVectors {
            first,
            second,
            output: out,
        } => finish(
            &mut output,
            run_append(first, second, out, writer_options),
            started,
        ),

        Commands::DotProductsDense {
            normalize,
            groups,
            vectors,
            output: out,
        } => {
            let mut options = settings.similarity.options();
            options.normalize |= *normalize;
            finish(
                &mut output,
                run_dot_products(groups, vectors, out, options, writer_options),
                started,
            )
        }

        Commands::Copy {
            matrix: true,
            input,
            output: out,
        } => finish(
            &mut output,
            run_copy::<Matrix>(input, out, writer_options),
            started,
        ),
        Commands::Copy {
            matrix: false,
            input,
            output: out,
        } => finish(
            &mut output,
            run_copy::<Vector>(input, out, writer_options),
            started,
        ),

        Commands::Init { force } => match init(*force) {
            Ok(path) => {
                println!("Created configuration file at: {}", path.display());
                println!("Edit this file to customize your settings.");
                ExitCode::Success
            }
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::ConfigError
            }
        },

        Commands::Config => match show_config(&settings, cli.json) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("Error displaying config: {e:#}");
                ExitCode::GeneralError
            }
        },
    };

    std::process::exit(exit_code.into());
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("loading {}", path.display())),
        None => Settings::load().map_err(|e| anyhow!("{e}")),
    }
}

fn init(force: bool) -> anyhow::Result<PathBuf> {
    let dir = std::env::current_dir().context("cannot determine current directory")?;
    Settings::init_config_file(dir, force).map_err(|e| anyhow!("{e}"))
}

fn show_config(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let rendered = if json {
        serde_json::to_string_pretty(settings)?
    } else {
        toml::to_string_pretty(settings)?
    };
    println!("{rendered}");
    Ok(())
}

/// Report a finished or failed run and pick the process exit code.
fn finish<S: RunSummary>(
    output: &mut OutputManager,
    result: PipelineResult<S>,
    started: Instant,
) -> ExitCode {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(summary) => {
            let code = summary.exit_code();
            output.report(summary, elapsed_ms).unwrap_or(code)
        }
        Err(e) => output
            .error(&e)
            .unwrap_or_else(|_| ExitCode::from_error(&e)),
    }
}

fn run_append(
    first: &str,
    second: &str,
    out: &str,
    options: WriterOptions,
) -> PipelineResult<ConcatSummary> {
    let mut first = VectorReader::open(first)?;
    let mut second = VectorReader::open(second)?;
    let mut writer = VectorWriter::open(out, options)?;
    append_vectors(&mut first, &mut second, &mut writer)
}

fn run_dot_products(
    groups: &str,
    vectors: &str,
    out: &str,
    options: SimilarityOptions,
    writer_options: WriterOptions,
) -> PipelineResult<SimilaritySummary> {
    let mut groups = GroupReader::open(groups)?;
    let vectors = RandomAccessVectorReader::open(vectors)?;
    let mut writer = MatrixWriter::open(out, writer_options)?;
    compute_dot_products_dense(&mut groups, &vectors, &mut writer, options)
}

fn run_copy<T: ArchiveValue>(
    input: &str,
    out: &str,
    options: WriterOptions,
) -> PipelineResult<CopySummary> {
    let mut reader = SequentialReader::<T>::open(input)?;
    let mut writer = ArchiveWriter::<T>::open(out, options)?;
    copy_records(&mut reader, &mut writer)
}
