use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use discretizer::config::persistence::RunHistory;
use discretizer::config::{ConfigManager, CriterionChoice, DiscretizeConfig};
use discretizer::runner::{self, GenerateOptions};
use discretizer::util::parse_coverage;
use discretizer::{error, Result, DEFAULT_INPUTS};

/// Discretizer - greedy cut-based discretization of decision tables
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every accepted cut
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Discretize one or more CSV files
    Run {
        /// Input CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Criteria to run: main, secondary or both
        #[arg(long)]
        criterion: Option<CriterionChoice>,

        /// Coverage at which the secondary criterion stops ("0.95" or "95%")
        #[arg(long, value_parser = parse_coverage)]
        target_coverage: Option<f64>,

        /// Directory for output files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write a JSON report per run
        #[arg(long)]
        report: bool,

        /// Do not record runs in the history
        #[arg(long)]
        no_history: bool,
    },
    /// Show identified columns and the first rows of a file
    Preview {
        file: PathBuf,

        /// Number of rows to show
        #[arg(long)]
        rows: Option<usize>,
    },
    /// Write a random decision table
    Generate {
        file: PathBuf,

        #[arg(long, default_value_t = 100)]
        rows: usize,

        #[arg(long, default_value_t = 2)]
        attributes: usize,

        #[arg(long, default_value_t = 2)]
        classes: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List or clear recorded runs
    History {
        /// Number of runs to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Remove all recorded runs
        #[arg(long)]
        clear: bool,
    },
    /// Show or initialise the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the flags
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("{}", error::user_friendly_message(&e));
        std::process::exit(error::exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Only commands that use the settings read the config file
    let manager = ConfigManager::new()?;

    match cli.command {
        None => {
            let files: Vec<PathBuf> = DEFAULT_INPUTS.iter().map(PathBuf::from).collect();
            run_files(&files, manager.load_config()?, !cli.quiet).await
        }
        Some(Command::Run {
            files,
            criterion,
            target_coverage,
            output_dir,
            report,
            no_history,
        }) => {
            let mut config = manager.load_config()?;
            if let Some(criterion) = criterion {
                config = config.with_criterion(criterion);
            }
            if let Some(target) = target_coverage {
                config = config.with_target_coverage(target);
            }
            if let Some(dir) = output_dir {
                config = config.with_output_dir(dir);
            }
            if report {
                config = config.with_write_report(true);
            }
            if no_history {
                config = config.with_record_history(false);
            }
            config.validate()?;
            run_files(&files, config, !cli.quiet).await
        }
        Some(Command::Preview { file, rows }) => {
            let rows = match rows {
                Some(rows) => rows,
                None => manager.load_config()?.preview_rows,
            };
            print!("{}", runner::preview(&file, rows)?);
            Ok(())
        }
        Some(Command::Generate {
            file,
            rows,
            attributes,
            classes,
            seed,
        }) => {
            let options = GenerateOptions {
                rows,
                attributes,
                classes,
                seed,
            };
            runner::generate_dataset(&file, &options)?;
            println!("Wrote {} rows to {}", rows, file.display());
            Ok(())
        }
        Some(Command::History { limit, clear }) => {
            if clear {
                manager.clear_records()?;
                println!("Run history cleared");
                return Ok(());
            }
            let records = manager.get_recent_records(limit)?;
            if records.is_empty() {
                println!("No recorded runs");
            }
            for record in records {
                println!("{}", record.summary());
            }
            Ok(())
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Show => {
                let path = manager.config_path();
                println!("# {}", path.display());
                match manager.load_config() {
                    Ok(config) => print!("{}", config.to_toml()?),
                    Err(e) => {
                        log::warn!("{}", e);
                        eprintln!("{}", error::user_friendly_message(&e));
                        print!("{}", fs::read_to_string(path)?);
                    }
                }
                Ok(())
            }
            ConfigAction::Init => {
                let path = manager.config_path().clone();
                if path.exists() {
                    println!("Configuration already exists at {}", path.display());
                } else {
                    manager.save_config(&DiscretizeConfig::default())?;
                    println!("Wrote default configuration to {}", path.display());
                }
                Ok(())
            }
        },
    }
}

async fn run_files(files: &[PathBuf], config: DiscretizeConfig, show_progress: bool) -> Result<()> {
    let history = if config.record_history {
        Some(RunHistory::new()?)
    } else {
        None
    };

    let summary = runner::process_files(files, &config, history.as_ref(), show_progress).await?;
    println!(
        "Completed {} runs, skipped {} of {} files",
        summary.records.len(),
        summary.skipped.len(),
        files.len()
    );
    Ok(())
}
