use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{fmt, prelude::*};

use marksheet::grading::{build_report, validate_grading, GradingConfig};
use marksheet::output;
use marksheet::report::{self, RawMark, Report, ReportRequest};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Human-readable memo
    Table,
    /// JSON in the published memo shape
    Json,
    /// Tab-separated subject rows
    Tsv,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grade one student from marks given on the command line
    Compute {
        /// Student PIN (seeds the external marks)
        #[arg(long)]
        pin: String,

        /// Unit-test marks, comma-separated (two attempts per subject)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        unit: Vec<String>,

        /// Sessional marks, comma-separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        session: Vec<String>,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        father: String,

        #[arg(long, default_value = "")]
        branch: String,

        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Grade every student record in the matching JSON/YAML files
    Batch {
        /// File paths or glob patterns (e.g. "records/*.json")
        #[arg(required = true)]
        patterns: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Write the built-in grading rules to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the grading rules in effect
    Config,
}

#[derive(Parser, Debug)]
#[command(name = "marksheet")]
#[command(about = "Reproducible marks memos from raw internal marks", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/marksheet/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .with(LevelFilter::from_level(level))
        .init();
}

fn render(report: &Report, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Table => output::format_report_table(report, output::should_use_colors()),
        Format::Json => output::format_report_json(report)?,
        Format::Tsv => output::format_report_tsv(report),
    })
}

/// Grade every record in the matched files. A bad record or file is reported
/// and skipped; the exit code only signals failure when nothing succeeded.
fn run_batch(patterns: &[String], format: Format, grading: &GradingConfig) -> i32 {
    let paths = match report::expand_patterns(patterns) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let mut rendered = Vec::new();
    let mut reports = Vec::new();
    let mut failures = 0usize;

    for path in &paths {
        let records = match report::load_records(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Skipping {}: {:#}", path.display(), e);
                failures += 1;
                continue;
            }
        };
        tracing::info!("{}: {} record(s)", path.display(), records.len());

        for record in records {
            match build_report(&record, grading) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    eprintln!("{} ({}): {}", record.identifier, path.display(), e);
                    failures += 1;
                }
            }
        }
    }

    match format {
        Format::Json => match serde_json::to_string_pretty(&reports) {
            Ok(json) => rendered.push(json),
            Err(e) => {
                eprintln!("Failed to serialize reports: {}", e);
                return EXIT_INPUT;
            }
        },
        _ => {
            for report in &reports {
                match render(report, format) {
                    Ok(text) => rendered.push(text),
                    Err(e) => eprintln!("{}: {:#}", report.pin, e),
                }
            }
        }
    }

    let separator = if matches!(format, Format::Table) { "\n\n" } else { "\n" };
    let out = rendered
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    if !out.is_empty() {
        println!("{}", out);
    }

    tracing::info!("Graded {} record(s), {} failed", reports.len(), failures);

    if reports.is_empty() && failures > 0 {
        EXIT_INPUT
    } else {
        EXIT_SUCCESS
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init { force } = cli.command {
        match marksheet::config::write_default_config(config_path, force) {
            Ok(path) => println!("Config written to {}", path.display()),
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match marksheet::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate grading config at startup
    let grading = config.effective_grading();
    if let Err(errors) = validate_grading(&grading) {
        eprintln!("Grading config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let code = match cli.command {
        Commands::Compute {
            pin,
            unit,
            session,
            name,
            father,
            branch,
            format,
        } => {
            let request = ReportRequest {
                identifier: pin,
                name,
                father,
                branch,
                unit_marks: unit.iter().map(|m| RawMark::from(m.as_str())).collect(),
                session_marks: session.iter().map(|m| RawMark::from(m.as_str())).collect(),
            };
            tracing::debug!(
                "Grading {} with {} unit and {} sessional marks",
                request.identifier,
                request.unit_marks.len(),
                request.session_marks.len()
            );

            match build_report(&request, &grading) {
                Ok(report) => match render(&report, format) {
                    Ok(text) => {
                        println!("{}", text);
                        EXIT_SUCCESS
                    }
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        EXIT_INPUT
                    }
                },
                Err(e) => {
                    eprintln!("Grading error: {}", e);
                    EXIT_INPUT
                }
            }
        }
        Commands::Batch { patterns, format } => run_batch(&patterns, format, &grading),
        Commands::Config => match serde_saphyr::to_string(&grading) {
            Ok(yaml) => {
                print!("{}", yaml);
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Config error: {}", e);
                EXIT_CONFIG
            }
        },
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}
