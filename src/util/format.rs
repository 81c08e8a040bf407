//! Formatting and parsing helpers
//!
//! Provides human-readable formatting of cut values, coverage ratios,
//! file sizes and elapsed times.

use std::time::Duration;

/// Format a cut value as the shortest decimal that reads back exactly
///
/// # Examples
/// ```
/// use discretizer::util::format::format_cut;
///
/// assert_eq!(format_cut(1.5), "1.5");
/// assert_eq!(format_cut(2.0), "2");
/// assert_eq!(format_cut(-0.25), "-0.25");
/// ```
pub fn format_cut(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

/// Format a coverage ratio as a percentage with one decimal
///
/// # Examples
/// ```
/// use discretizer::util::format::format_coverage;
///
/// assert_eq!(format_coverage(0.875), "87.5%");
/// assert_eq!(format_coverage(1.0), "100.0%");
/// ```
pub fn format_coverage(coverage: f64) -> String {
    format!("{:.1}%", coverage * 100.0)
}

/// Parse a coverage ratio given as a fraction ("0.95") or percentage ("95%")
///
/// The result must lie in (0, 1].
///
/// # Examples
/// ```
/// use discretizer::util::format::parse_coverage;
///
/// assert_eq!(parse_coverage("0.9").unwrap(), 0.9);
/// assert_eq!(parse_coverage("50%").unwrap(), 0.5);
/// ```
pub fn parse_coverage(input: &str) -> Result<f64, String> {
    let input = input.trim();

    let value = if let Some(percent) = input.strip_suffix('%') {
        let number: f64 = percent
            .trim()
            .parse()
            .map_err(|_| format!("Invalid percentage: {}", input))?;
        number / 100.0
    } else {
        input
            .parse()
            .map_err(|_| format!("Invalid number: {}", input))?
    };

    if !(value > 0.0 && value <= 1.0) {
        return Err(format!("Coverage must be in (0, 1], got {}", input));
    }
    Ok(value)
}

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use discretizer::util::format::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format an elapsed time at millisecond precision
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use discretizer::util::format::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(1500)), "1s 500ms");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let truncated = Duration::from_millis(elapsed.as_millis() as u64);
    humantime::format_duration(truncated).to_string()
}
