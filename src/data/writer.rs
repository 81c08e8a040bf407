//! Output files for discretization results

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use log::info;

use crate::discretize::Criterion;
use crate::models::{DiscretizationReport, DiscretizationResult};
use crate::{DiscretizeError, Result, OUTPUT_SUFFIX, REPORT_SUFFIX};

/// Path of the discretized table for an input file and criterion.
///
/// `data/iris.csv` with the main criterion becomes
/// `data/iris.csv_main_discretized.csv`, or the same name inside
/// `output_dir` when one is given.
pub fn output_path(input: &Path, criterion: Criterion, output_dir: Option<&Path>) -> PathBuf {
    derived_path(input, criterion, OUTPUT_SUFFIX, output_dir)
}

/// Path of the JSON report for an input file and criterion
pub fn report_path(input: &Path, criterion: Criterion, output_dir: Option<&Path>) -> PathBuf {
    derived_path(input, criterion, REPORT_SUFFIX, output_dir)
}

fn derived_path(
    input: &Path,
    criterion: Criterion,
    suffix: &str,
    output_dir: Option<&Path>,
) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let name = format!("{}_{}_{}", file_name, criterion.name(), suffix);

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.parent().unwrap_or_else(|| Path::new("")).join(name),
    }
}

/// Failures on the output side are never blamed on the input file
pub(crate) fn output_error(path: &Path, err: impl std::fmt::Display) -> DiscretizeError {
    DiscretizeError::Persistence(format!("Failed to write {}: {}", path.display(), err))
}

/// Write the discretized table with the original header
pub fn write_discretized(result: &DiscretizationResult, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| output_error(path, e))?;
    writer
        .write_record(&result.header)
        .map_err(|e| output_error(path, e))?;
    for row in &result.rows {
        writer.write_record(row).map_err(|e| output_error(path, e))?;
    }
    writer.flush().map_err(|e| output_error(path, e))?;

    info!(
        "Wrote {} discretized rows to {}",
        result.rows.len(),
        path.display()
    );
    Ok(())
}

/// Write a pretty-printed JSON report
pub fn write_report(report: &DiscretizationReport, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    fs::write(path, content).map_err(|e| output_error(path, e))?;
    info!("Wrote report to {}", path.display());
    Ok(())
}
