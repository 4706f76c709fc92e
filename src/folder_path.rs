//! Remote folder path resolution.
//!
//! Pure string logic, no I/O: a folder path is the configured base path, a
//! formatted date token and an optional suffix, normalized to exactly one
//! leading `/` with no empty segments.

use chrono::NaiveDate;

use crate::dates::DateFormat;

/// Compute the remote folder path for one processing date.
///
/// The base path may carry or omit a leading/trailing `/`; the result always
/// starts with a single `/` and never contains `//`. The suffix, when present,
/// is appended verbatim after the date token.
pub fn resolve_folder_path(
    base: &str,
    date: NaiveDate,
    format: DateFormat,
    suffix: Option<&str>,
) -> String {
    let mut path = String::from("/");
    for segment in segments(base) {
        path.push_str(segment);
        path.push('/');
    }
    path.push_str(&format.format(date));
    if let Some(suffix) = suffix {
        path.push_str(suffix);
    }
    path
}

/// Non-empty `/`-separated segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
