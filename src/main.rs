//! pdfprep command-line interface
//!
//! Walks a folder tree, normalizes every PDF into a `processed` folder next to
//! it and writes a before/after property report.
//!
//! Exit codes: 0 all files succeeded (or none found), 1 usage or configuration
//! error, 2 at least one file failed.

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pdfprep::{describe_visibility, init_logging, LogLevel, Pipeline, ProcessingConfig, ReportFormat};
use tracing::{error, info};

const EXIT_USAGE: i32 = 1;
const EXIT_PARTIAL_FAILURE: i32 = 2;

fn main() {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    let level = if matches.get_flag("quiet") {
        LogLevel::Error
    } else {
        matches
            .get_one::<String>("verbose")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    };
    init_logging(level);

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(message) => {
            error!("{}", message);
            process::exit(EXIT_USAGE);
        }
    };

    let root = matches.get_one::<PathBuf>("folder_path").cloned().unwrap_or_default();

    info!("{}", "=".repeat(60));
    info!("PDF Batch Processor");
    info!("Bookmark visibility: {}", describe_visibility(config.visible_levels));
    if !config.linearization.enabled {
        info!("Linearization disabled");
    }
    info!("{}", "=".repeat(60));

    let pipeline = Pipeline::new(config);
    match pipeline.run_batch(&root) {
        Ok(summary) if summary.all_succeeded() => {}
        Ok(summary) => {
            for (path, reason) in &summary.failed {
                error!("Failed: {}: {}", path.display(), reason);
            }
            process::exit(EXIT_PARTIAL_FAILURE);
        }
        Err(e) => {
            error!("{}", e);
            process::exit(EXIT_USAGE);
        }
    }
}

/// Config file first, then command-line overrides
fn build_config(matches: &ArgMatches) -> Result<ProcessingConfig, String> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ProcessingConfig::from_file(path).map_err(|e| e.to_string())?,
        None => ProcessingConfig::default(),
    };

    if let Some(&levels) = matches.get_one::<i64>("bookmark-levels") {
        if levels < 0 {
            return Err("bookmark-levels must be 0 or greater".to_string());
        }
        config.visible_levels = u32::try_from(levels).map_err(|_| format!("bookmark-levels too large: {}", levels))?;
    }
    if let Some(&jobs) = matches.get_one::<usize>("jobs") {
        config.jobs = jobs;
    }
    if matches.get_flag("no-linearize") {
        config.linearization.enabled = false;
    }
    if let Some(qpdf) = matches.get_one::<PathBuf>("qpdf") {
        config.linearization.qpdf_path = qpdf.clone();
    }
    if let Some(format) = matches.get_one::<String>("report-format") {
        config.report.format = format.parse::<ReportFormat>().map_err(|e| e.to_string())?;
    }
    if matches.get_flag("no-report") {
        config.report.enabled = false;
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn build_cli() -> Command {
    Command::new("pdfprep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch process PDF files with metadata removal and bookmark management")
        .after_help(
            "Bookmark levels:\n  \
             0 = Expand all bookmark levels\n  \
             1 = Only top-level bookmarks visible (default)\n  \
             2 = Top-level and first children visible\n  \
             N = N levels visible",
        )
        .arg(Arg::new("folder_path")
            .value_name("FOLDER")
            .value_parser(value_parser!(PathBuf))
            .help("Folder containing PDF files (searched recursively)")
            .required(true))

        .arg(Arg::new("bookmark-levels")
            .short('b')
            .long("bookmark-levels")
            .value_name("N")
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true)
            .help("Number of bookmark levels to keep visible [default: 1]"))

        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Configuration file (JSON/YAML)"))

        .arg(Arg::new("jobs")
            .short('j')
            .long("jobs")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .help("Number of files processed in parallel"))

        .arg(Arg::new("no-linearize")
            .long("no-linearize")
            .action(ArgAction::SetTrue)
            .help("Skip fast web view linearization"))

        .arg(Arg::new("qpdf")
            .long("qpdf")
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("Path to the qpdf executable used for linearization"))

        .arg(Arg::new("report-format")
            .long("report-format")
            .value_parser(["csv", "json"])
            .help("Comparison report format"))

        .arg(Arg::new("no-report")
            .long("no-report")
            .action(ArgAction::SetTrue)
            .help("Do not write the comparison report"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_name("LEVEL")
            .value_parser(LogLevel::NAMES)
            .default_value("info")
            .help("Set logging verbosity"))

        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .help("Suppress all output except errors"))
}
