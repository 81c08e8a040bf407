//! File-level orchestration
//!
//! Loads inputs, runs the configured criteria off the async runtime with a
//! progress spinner, writes outputs and records runs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::WriterBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::config::persistence::RunHistory;
use crate::config::DiscretizeConfig;
use crate::data::{self, DecisionTable};
use crate::discretize::{Criterion, Discretizer, ProgressUpdate};
use crate::models::{DiscretizationResult, RunRecord};
use crate::util::{format_coverage, format_cut, format_elapsed};
use crate::{error, DiscretizeError, Result};

/// Outcome of processing a batch of files
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Records of every successful run
    pub records: Vec<RunRecord>,
    /// Files skipped because of input problems, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

/// Run one criterion on a blocking thread, streaming progress to a spinner.
pub async fn run_criterion(
    table: Arc<DecisionTable>,
    criterion: Criterion,
    show_progress: bool,
) -> Result<DiscretizationResult> {
    let discretizer = Discretizer::new(criterion)?;
    let (tx, mut rx) = mpsc::channel::<ProgressUpdate>(100);

    let pb = if show_progress {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("{}: searching cuts", criterion.name()));

    let display = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            pb.tick();
            pb.set_message(format!(
                "{}: {} cuts, {}/{} pairs ({})",
                criterion.name(),
                update.iteration,
                update.separated_pairs,
                update.total_pairs,
                format_coverage(update.coverage())
            ));
        }
        pb.finish_and_clear();
    });

    let worker = tokio::task::spawn_blocking(move || discretizer.run(&table, Some(&tx)));
    let result = worker.await.map_err(|e| {
        if e.is_cancelled() {
            DiscretizeError::Cancelled("discretization task was cancelled".to_string())
        } else {
            DiscretizeError::Worker(format!("discretization task failed: {}", e))
        }
    })?;
    display.await.ok();
    result
}

/// Load a file, run every configured criterion and write the outputs.
pub async fn process_file(
    path: &Path,
    config: &DiscretizeConfig,
    history: Option<&RunHistory>,
    show_progress: bool,
) -> Result<Vec<RunRecord>> {
    println!("Processing file: {}", path.display());
    let table = Arc::new(data::load_data(path)?);

    let mut records = Vec::new();
    for criterion in config.criteria() {
        let result = run_criterion(Arc::clone(&table), criterion, show_progress).await?;

        let output_dir = config.output_dir.as_deref();
        let output = data::output_path(path, criterion, output_dir);
        data::write_discretized(&result, &output)?;

        if config.write_report {
            let report = data::report_path(path, criterion, output_dir);
            data::write_report(&result.report(path.to_path_buf()), &report)?;
        }

        print_result(&result, &output);

        let record = RunRecord::new(path.to_path_buf(), Some(output), &result);
        if let Some(history) = history {
            history.append(record.clone())?;
        }
        records.push(record);
    }

    Ok(records)
}

/// Process several files. Input problems skip the file; anything else aborts.
pub async fn process_files(
    paths: &[PathBuf],
    config: &DiscretizeConfig,
    history: Option<&RunHistory>,
    show_progress: bool,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for path in paths {
        match process_file(path, config, history, show_progress).await {
            Ok(records) => summary.records.extend(records),
            Err(e) if error::is_recoverable(&e) => {
                let message = error::user_friendly_message(&e);
                warn!("Skipping {}: {}", path.display(), e);
                println!("{}\n", message);
                summary.skipped.push((path.clone(), message));
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Processed {} runs, skipped {} files",
        summary.records.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn print_result(result: &DiscretizationResult, output: &Path) {
    println!(
        "  {}: {} cuts, {}/{} pairs separated ({}) in {}",
        result.criterion,
        result.stats.cuts_added,
        result.stats.separated_pairs,
        result.stats.total_pairs,
        format_coverage(result.stats.coverage),
        format_elapsed(result.stats.elapsed)
    );
    for (attribute, cuts) in result.cuts.iter() {
        if cuts.is_empty() {
            continue;
        }
        let values: Vec<String> = cuts.iter().map(|c| format_cut(*c)).collect();
        println!("    {}: {}", attribute, values.join(", "));
    }
    println!("  -> {}\n", output.display());
}

/// Render the identified columns and the first `rows` objects of a file.
pub fn preview(path: &Path, rows: usize) -> Result<String> {
    let table = data::load_data(path)?;
    let (attributes, decision) = data::prepare_for_discretization(&table);

    let mut out = String::new();
    let _ = writeln!(out, "File: {}", path.display());
    let _ = writeln!(
        out,
        "Objects: {}, attributes: {}, decision: '{}'",
        table.num_objects(),
        attributes.len(),
        decision
    );

    let classes: Vec<String> = table
        .class_counts()
        .iter()
        .map(|(label, count)| format!("{}={}", label, count))
        .collect();
    let _ = writeln!(out, "Classes: {}", classes.join(", "));
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", table.header().join("\t"));
    for object in 0..rows.min(table.num_objects()) {
        let mut cells: Vec<String> = table.row(object).iter().map(|v| format_cut(*v)).collect();
        cells.push(table.decision(object).to_string());
        let _ = writeln!(out, "{}", cells.join("\t"));
    }

    Ok(out)
}

/// Parameters for a random decision table
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub rows: usize,
    pub attributes: usize,
    pub classes: usize,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            rows: 100,
            attributes: 2,
            classes: 2,
            seed: None,
        }
    }
}

impl GenerateOptions {
    /// Validate the generation parameters
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(DiscretizeError::Config(
                "Row count must be greater than 0".to_string(),
            ));
        }
        if self.attributes == 0 {
            return Err(DiscretizeError::Config(
                "Attribute count must be greater than 0".to_string(),
            ));
        }
        if !(1..=26).contains(&self.classes) {
            return Err(DiscretizeError::Config(format!(
                "Class count must be between 1 and 26, got {}",
                self.classes
            )));
        }
        Ok(())
    }
}

/// Write a random decision table: uniform attribute values in [0, 1)
/// and class labels `A`, `B`, ...
pub fn generate_dataset(path: &Path, options: &GenerateOptions) -> Result<()> {
    options.validate()?;

    let mut rng = match options.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| data::output_error(path, e))?;
    let mut header: Vec<String> = (1..=options.attributes)
        .map(|i| format!("attr{}", i))
        .collect();
    header.push("decision".to_string());
    writer
        .write_record(&header)
        .map_err(|e| data::output_error(path, e))?;

    for _ in 0..options.rows {
        let mut record: Vec<String> = (0..options.attributes)
            .map(|_| format!("{:.6}", rng.gen::<f64>()))
            .collect();
        let class = rng.gen_range(0..options.classes) as u8;
        record.push(char::from(b'A' + class).to_string());
        writer
            .write_record(&record)
            .map_err(|e| data::output_error(path, e))?;
    }
    writer.flush().map_err(|e| data::output_error(path, e))?;

    info!(
        "Generated {} rows with {} attributes into {}",
        options.rows,
        options.attributes,
        path.display()
    );
    Ok(())
}
