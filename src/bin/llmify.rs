//! llmify CLI - Flatten a codebase into a single LLM-ready document.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, Shell};
use llmify::builder::Extractor;
use llmify::config::Resolver;
use llmify::errors::{exit_code, LlmifyError};
use llmify::output::{format_output, write_output, OutputFormat, STDOUT_TARGET};
use llmify::tokens::{Encoding, TokenCounter};
use llmify::tree::format_number;

#[derive(Parser)]
#[command(name = "llmify")]
#[command(about = "Flatten a codebase into a single document for LLMs")]
#[command(version)]
struct Cli {
    /// Root directory to scan
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = "codebase.txt")]
    output: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    output_format: FormatArg,

    /// Count tokens per file and in total
    #[arg(short, long)]
    tokenize: bool,

    /// Token encoding
    #[arg(short, long, value_enum, default_value = "cl100k")]
    encoding: EncodingArg,

    /// Configuration file (overrides the default locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show file sizes in the directory listing
    #[arg(long)]
    sizes: bool,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Clone, ValueEnum)]
enum EncodingArg {
    Cl100k,
    O200k,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cl100k => Encoding::Cl100kBase,
            EncodingArg::O200k => Encoding::O200kBase,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        generate(shell, &mut Cli::command(), "llmify", &mut std::io::stdout());
        return;
    }

    setup_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        let code = exit_code(&e);
        log::debug!("Exiting with code {}", code);
        std::process::exit(code);
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run(cli: Cli) -> Result<(), LlmifyError> {
    let resolved = Resolver::new()
        .explicit_config(cli.config)
        .resolve(&cli.directory)?;
    if let Some(location) = &resolved.location {
        log::info!("Using {} config {}", location.source, location.path.display());
    }

    let mut extractor = Extractor::new(&cli.directory, resolved.rules).show_sizes(cli.sizes);
    if cli.output.as_os_str() != STDOUT_TARGET {
        extractor = extractor.skip_file(&cli.output);
    }
    let mut result = extractor.extract()?;

    if cli.tokenize {
        let counter = TokenCounter::new(cli.encoding.into());
        result.annotate_tokens(&counter);
    }

    let rendered = format_output(&result, cli.output_format.into())?;
    write_output(&cli.output, &rendered)?;

    if cli.output.as_os_str() == STDOUT_TARGET {
        log::info!("Wrote {} files to stdout", result.files.len());
    } else {
        log::info!(
            "Wrote {} files to {}",
            result.files.len(),
            cli.output.display()
        );
    }
    if let Some(total) = result.total_token_count {
        log::info!("Total tokens: {}", format_number(total));
    }

    Ok(())
}
