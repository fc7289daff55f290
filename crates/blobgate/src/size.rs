//! Human readable byte sizes ("300 MB", "1.5GiB", "20k")

use std::fmt;

/// Error returned when a size string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeError(String);

impl fmt::Display for ParseSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid size: {:?}", self.0)
    }
}

impl std::error::Error for ParseSizeError {}

const KB: f64 = 1000.0;
const MB: f64 = KB * 1000.0;
const GB: f64 = MB * 1000.0;
const TB: f64 = GB * 1000.0;
const PB: f64 = TB * 1000.0;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;
const PIB: f64 = TIB * 1024.0;

/// Parse a size string into a byte count.
///
/// Plain unit letters are decimal (`MB` = 1000²), `i` units are binary
/// (`MiB` = 1024²). Units are case-insensitive, the trailing `b` is
/// optional, and a bare number is a byte count. Fractions are truncated.
pub fn parse_size(input: &str) -> Result<u64, ParseSizeError> {
    let invalid = || ParseSizeError(input.to_string());

    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1.0,
        "k" | "kb" => KB,
        "m" | "mb" => MB,
        "g" | "gb" => GB,
        "t" | "tb" => TB,
        "p" | "pb" => PB,
        "ki" | "kib" => KIB,
        "mi" | "mib" => MIB,
        "gi" | "gib" => GIB,
        "ti" | "tib" => TIB,
        "pi" | "pib" => PIB,
        _ => return Err(invalid()),
    };

    let bytes = value * multiplier;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(invalid());
    }

    Ok(bytes as u64)
}

/// Format a byte count with decimal units
pub fn format_size(bytes: u64) -> String {
    let value = bytes as f64;

    if value >= PB {
        format!("{:.2} PB", value / PB)
    } else if value >= TB {
        format!("{:.2} TB", value / TB)
    } else if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} kB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
