// Tender BoQ CLI - merge contractor workbooks and compare bids

mod compare;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE, EXIT_WORKBOOK_PARSE};

#[derive(Parser)]
#[command(name = "boq")]
#[command(about = "Merge tender BoQ workbooks and compare contractor bids")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge workbooks, compare bids and write the highlighted workbook
    #[command(after_help = "\
Examples:
  boq compare client.xlsx alpha.xlsx beta.xlsx
  boq compare *.xlsx --first-three --output comparison.xlsx
  boq compare *.xlsx --json > result.json
  boq compare *.xlsx --config tender.toml --strict")]
    Compare {
        /// Input workbooks; the first supplies the shared leading columns
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Compare only the first three contractors
        #[arg(long)]
        first_three: bool,

        /// Highlighted workbook path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the full result as JSON to a file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write the per-sheet summary table as CSV
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Exit non-zero when any bid is missing
        #[arg(long)]
        strict: bool,
    },

    /// Merge workbooks side by side without comparing
    #[command(after_help = "\
Examples:
  boq merge client.xlsx alpha.xlsx beta.xlsx --output merged.xlsx")]
    Merge {
        /// Input workbooks; the first supplies the shared leading columns
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Merged workbook path
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Show the detected header row and column roles of each merged sheet
    Headers {
        /// Input workbooks
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  boq validate tender.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  tender-recon ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("BOQ_BUILD_PROFILE"),
        "\ntarget:  ", env!("BOQ_BUILD_TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare { files, config, first_three, output, json, report, summary_csv, strict } => {
            compare::cmd_compare(compare::CompareArgs {
                files,
                config,
                first_three,
                output,
                json,
                report,
                summary_csv,
                strict,
            })
        }
        Commands::Merge { files, output } => compare::cmd_merge(files, output),
        Commands::Headers { files, config, json } => compare::cmd_headers(files, config, json),
        Commands::Validate { config } => compare::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WORKBOOK_PARSE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
