use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use tasi::export::{ExportError, write_csv};
use tasi::utils::ScrapeStats;
use tasi::{
    CSV_FILE_NAME, Collector, MemberRecord, MemberTable, PageSource, ScrapeOutcome, WebScraper,
};

#[derive(Parser)]
#[command(name = "tasi")]
#[command(about = "A tasi.org member directory scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every member in the directory and print or export the table
    Scrape {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(
            long,
            value_name = "PATH",
            num_args = 0..=1,
            default_missing_value = CSV_FILE_NAME,
            help = "Also write the table as CSV to PATH"
        )]
        file: Option<PathBuf>,

        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u16).range(1..),
            help = "Detail pages fetched at once"
        )]
        concurrency: u16,
    },
    /// List the member references found on the directory page
    List {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Fetch and parse a single member detail page
    Detail {
        #[arg(help = "Member reference or full URL of the detail page")]
        url_or_ref: String,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn print_csv(table: &MemberTable) {
    if let Err(e) = write_csv(table, io::stdout().lock()) {
        log::error!("Error writing CSV: {}", e);
        process::exit(1);
    }
}

fn export_csv_file(table: &MemberTable, path: &Path) {
    let result = File::create(path)
        .map_err(ExportError::from)
        .and_then(|file| write_csv(table, BufWriter::new(file)));

    match result {
        Ok(()) => log::info!("Wrote {} row(s) to {}", table.len(), path.display()),
        Err(e) => {
            log::error!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    match cli.command {
        Commands::Scrape {
            format,
            file,
            concurrency,
        } => {
            log::info!("Scraping data... This may take a while.");

            let report = Collector::new()
                .concurrency(concurrency.into())
                .on_progress(|p| {
                    log::debug!("Progress: {}/{} ({} failed)", p.done, p.total, p.failed)
                })
                .run(&scraper)
                .await
                .unwrap_or_else(|e| {
                    log::error!("{}", e);
                    process::exit(1);
                });

            let stats = ScrapeStats::from_report(&report);

            let table = match report.outcome {
                ScrapeOutcome::Table(table) => table,
                ScrapeOutcome::NoData(message) => {
                    log::warn!("{}", message);
                    println!("{}", message);
                    return;
                }
            };

            if let Some(path) = &file {
                export_csv_file(&table, path);
            }

            match format {
                OutputFormat::Json => serialize_json(&table),
                OutputFormat::Csv => print_csv(&table),
                OutputFormat::Text => {
                    println!("Scraping completed!\n");
                    print!("{}", table);
                    for warning in &report.warnings {
                        println!("Skipped: {}", warning);
                    }
                    print!("{}", stats);
                }
            }
        }

        Commands::List { format } => {
            let refs = scraper.fetch_member_refs().await.unwrap_or_else(|e| {
                log::error!("Error fetching member listing: {}", e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&refs),
                OutputFormat::Csv => {
                    let table: MemberTable = refs
                        .iter()
                        .map(|r| {
                            [("ref", r.clone()), ("url", scraper.detail_url(r))]
                                .into_iter()
                                .collect::<MemberRecord>()
                        })
                        .collect::<Vec<_>>()
                        .into();
                    print_csv(&table);
                }
                OutputFormat::Text => {
                    if refs.is_empty() {
                        println!("No entries to display.");
                    }
                    for (i, r) in refs.iter().enumerate() {
                        println!("{:>3}. {} -> {}", i + 1, r, scraper.detail_url(r));
                    }
                }
            }
        }

        Commands::Detail { url_or_ref, format } => {
            let url = scraper.resolve_detail_url(&url_or_ref);
            log::info!("Fetching member detail from {}...", url);

            let record = scraper.fetch_member_record(&url).await.unwrap_or_else(|e| {
                log::error!("Error fetching details from {}: {}", url, e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&record),
                OutputFormat::Csv => print_csv(&MemberTable::new(vec![record])),
                OutputFormat::Text => println!("{}", record),
            }
        }
    }
}
