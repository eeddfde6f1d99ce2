use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use eml_searchable::{
    DEFAULT_TOOL, PlatformMetadata, PstExtractor, WalkConfig, WalkReport, process_tree,
};

/// Fixture folder used by `--test`
const TEST_FOLDER: &str = "tests/fixtures";

/// Verbosity level that turns on debug logs and strict mode
const DEBUG_LEVEL: u8 = 4;

#[derive(Parser, Debug)]
#[command(author, version, about = "Processing emails for easier desktop searches")]
struct Args {
    /// Process a .pst archive (Y) or a folder of .eml/.ics files (N)
    #[arg(long, action = ArgAction::Set, value_parser = parse_yes_no, default_value = "N")]
    pst: bool,

    /// Folder where processing occurs (holds the .pst in PST mode)
    #[arg(long, short = 'f', env = "EML_FOLDER")]
    folder: Option<PathBuf>,

    /// The .pst file to convert, relative to --folder
    #[arg(long, short = 'n')]
    filename: Option<PathBuf>,

    /// Where PST mode writes message files (default: <folder>/eml)
    #[arg(long, env = "EML_OUTPUT_FOLDER")]
    eml_folder: Option<PathBuf>,

    /// PST conversion tool
    #[arg(long, env = "READPST_PATH", default_value = DEFAULT_TOOL)]
    readpst: PathBuf,

    /// Ignore file extensions (N only processes .eml and .ics)
    #[arg(
        long,
        short = 'i',
        action = ArgAction::Set,
        value_parser = parse_yes_no,
        default_value = "N"
    )]
    ignore: bool,

    /// Verbosity; 4 enables debug logs and stops on the first error
    #[arg(long, short = 'v', default_value_t = 2)]
    verbose: u8,

    /// Stop on the first file that cannot be processed
    #[arg(long)]
    strict: bool,

    /// Run over the test fixtures instead of --folder
    #[arg(
        long,
        short = 't',
        action = ArgAction::Set,
        value_parser = parse_yes_no,
        default_value = "N"
    )]
    test: bool,

    /// In PST mode, process the extracted tree right away
    #[arg(long, action = ArgAction::Set, value_parser = parse_yes_no, default_value = "N")]
    process_output: bool,

    /// Summary format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Accept the usual spellings of yes and no
fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got {value:?}")),
    }
}

fn init_tracing(verbose: u8) {
    let default = if verbose >= DEBUG_LEVEL { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!("logging set to {default}");
}

fn print_report(report: &WalkReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn walk(folder: &Path, config: &WalkConfig, format: ReportFormat) -> Result<()> {
    let report = process_tree(folder, config, &PlatformMetadata)
        .with_context(|| format!("processing {}", folder.display()))?;
    print_report(&report, format)
}

fn main() -> Result<()> {
    let mut args = Args::parse();
    init_tracing(args.verbose);

    if args.test {
        args.pst = false;
        args.folder = Some(PathBuf::from(TEST_FOLDER));
    }

    let config = WalkConfig {
        require_known_extension: !args.ignore,
        strict_mode: args.strict || args.verbose >= DEBUG_LEVEL,
    };

    let Some(folder) = args.folder.as_deref() else {
        bail!("need to provide .pst file path or .eml folder for processing");
    };

    if args.pst {
        let filename = args
            .filename
            .as_deref()
            .context("--filename is required in PST mode")?;
        let pst = folder.join(filename);
        let destination = args
            .eml_folder
            .clone()
            .unwrap_or_else(|| folder.join("eml"));

        PstExtractor::new(&args.readpst)
            .extract(&pst, &destination)
            .with_context(|| format!("converting {}", pst.display()))?;
        println!("extracted {} into {}", pst.display(), destination.display());

        if args.process_output {
            walk(&destination, &config, args.report)?;
        }
        return Ok(());
    }

    if !folder.is_dir() {
        bail!(
            "need to provide .pst file path or .eml folder for processing: {} not found",
            folder.display()
        );
    }

    walk(folder, &config, args.report)
}
