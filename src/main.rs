//! grisbi2ledger main entry point

use clap::{Parser, ValueEnum};
use grisbi2ledger_config::Config;
use grisbi2ledger_core::{Conversion, Converter, ValidationReport};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when the input fails validation
const EXIT_INVALID: u8 = 1;
/// Exit status for fatal parse, load, configuration and IO errors
const EXIT_FATAL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FindingsFormat {
    /// One line per finding on stderr
    Text,
    /// JSON report on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "grisbi2ledger")]
#[command(version)]
#[command(about = "Convert a Grisbi .gsb file into a Ledger journal", long_about = None)]
struct Args {
    /// Grisbi .gsb file to read from
    #[arg(required_unless_present = "print_default_config")]
    input: Option<PathBuf>,

    /// Ledger journal to write to
    #[arg(required_unless_present = "print_default_config")]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How to report validation findings
    #[arg(long, value_enum, default_value_t = FindingsFormat::Text)]
    findings: FindingsFormat,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return ExitCode::SUCCESS;
    }

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                init_logging("error");
                log::error!("[{}] Failed to load configuration: {}", e.code(), e);
                return ExitCode::from(EXIT_FATAL);
            }
        },
        None => Config::default(),
    };
    init_logging(&config.logging.level);

    let (Some(input), Some(output)) = (args.input, args.output) else {
        log::error!("Input and output paths are required");
        return ExitCode::from(EXIT_FATAL);
    };

    let converter = Converter::new(config.ledger);
    let journal = match converter.convert_file(&input) {
        Ok(Conversion::Rendered(journal)) => journal,
        Ok(Conversion::Rejected(report)) => {
            report_findings(&report, args.findings);
            return ExitCode::from(EXIT_INVALID);
        }
        Err(e) => {
            log::error!("[{}] {} ({})", e.code(), e, e.severity());
            return ExitCode::from(EXIT_FATAL);
        }
    };

    if let Err(e) = std::fs::write(&output, journal) {
        log::error!("Failed to write {}: {}", output.display(), e);
        return ExitCode::from(EXIT_FATAL);
    }
    log::info!("Wrote {}", output.display());

    ExitCode::SUCCESS
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn report_findings(report: &ValidationReport, format: FindingsFormat) {
    match format {
        FindingsFormat::Text => {
            for finding in &report.findings {
                eprintln!("{}", finding);
            }
        }
        FindingsFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialise findings: {}", e),
        },
    }
}
