//! Filename and header token rewriting.
//!
//! USDA-ARS files in the ISMN database encode the sensor supply voltage as
//! `(2.5-Volt)---` in the file name and ` (2.5 Volt) - ` in the header line.
//! The canonical forms are `2500-mV-` and ` 2500 mV ` respectively.

/// Old unit marker inside a file name.
pub const FILENAME_TOKEN: &str = "(2.5-Volt)---";

/// Canonical replacement for [`FILENAME_TOKEN`].
pub const FILENAME_REPLACEMENT: &str = "2500-mV-";

/// Old unit marker inside the first line of a file.
pub const HEADER_TOKEN: &str = " (2.5 Volt) - ";

/// Canonical replacement for [`HEADER_TOKEN`].
pub const HEADER_REPLACEMENT: &str = " 2500 mV ";

/// Rewrite a file name into its canonical form.
///
/// Returns `None` when the name carries no [`FILENAME_TOKEN`], which is how
/// already adapted or unrelated files are recognised.
pub fn canonical_file_name(name: &str) -> Option<String> {
    let (prefix, suffix) = name.split_once(FILENAME_TOKEN)?;
    Some(format!("{prefix}{FILENAME_REPLACEMENT}{suffix}"))
}

/// Rewrite a header line into its canonical form.
///
/// The words after the token are joined with underscores; the line ending,
/// if any, stays attached to the last word.
pub fn canonical_header(line: &str) -> Option<String> {
    let (prefix, suffix) = line.split_once(HEADER_TOKEN)?;
    let joined = suffix.split(' ').collect::<Vec<_>>().join("_");
    Some(format!("{prefix}{HEADER_REPLACEMENT}{joined}"))
}
