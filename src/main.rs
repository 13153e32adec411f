use clap::{Parser as ClapParser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tddf_loader::OutputFormat;
use tddf_loader::cli::{self, CheckOptions, CheckResult, CliError, LoadCommand};

#[derive(ClapParser)]
#[command(name = "tddf")]
#[command(about = "TDDF - Compile trajectory data descriptions and load trajectory datasets")]
#[command(version)]
struct Cli {
    /// Log every processing step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a TDDF description
    Check {
        /// TDDF file (reads from stdin if not provided)
        format: Option<PathBuf>,

        /// Print the compiled format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transform every input file into the output directory
    Load {
        /// TDDF file describing the input records
        #[arg(short, long)]
        format: PathBuf,

        /// Input file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Output shape: ALL, SPATIAL or SPATIAL_TEMPORAL (overrides _OUTPUT_FORMAT)
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Number of files processed concurrently
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a specific topic
    Doc {
        /// Topic name (use 'tddf docs' to list topics)
        topic: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Check { format, json } => run_check(format, json),
        Commands::Load {
            format,
            input,
            output,
            output_format,
            workers,
            json,
        } => run_load(
            LoadCommand {
                format,
                input,
                output,
                output_format,
                workers,
            },
            json,
        ),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { topic } => match cli::get_doc_topic(&topic) {
            Ok(content) => {
                print!("{}", content);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    let _ = builder.try_init();
}

fn run_check(format: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let input = match format {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    match cli::execute_check(&CheckOptions { input, json })? {
        CheckResult::Valid(format) => println!(
            "Data format is valid: {} attributes, output {}",
            format.num_valid_attributes(),
            format.output_format()
        ),
        CheckResult::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn run_load(command: LoadCommand, json: bool) -> Result<(), CliError> {
    let report = cli::execute_load(&command)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&cli::report_to_json(&report))?);
    } else {
        println!(
            "{} files ({} failed), {} records written, {} dropped",
            report.files, report.failed_files, report.records_written, report.records_dropped
        );
        println!("{}", report.metadata_script);
    }
    Ok(())
}
