//! Object key layout for daily log objects
//!
//! - `{directory}/{date}.log` is the current object for a UTC day
//! - `{directory}/{date}.{sequence}.log` are its rotated archives, `sequence`
//!   starting at 1 and growing by one past the largest seen

use chrono::NaiveDate;

const LOG_EXTENSION: &str = ".log";

pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn join(directory: &str, file_name: &str) -> String {
    let key = format!("{}/{}", directory.trim_matches('/'), file_name);
    key.trim_matches('/').to_string()
}

/// Key of the object currently being appended to for `date`
pub fn current_key(directory: &str, date: NaiveDate) -> String {
    join(directory, &format!("{}{}", date_stamp(date), LOG_EXTENSION))
}

/// Sequence number encoded in a key belonging to `date`, `None` for keys of
/// other days. The current object and malformed suffixes count as 0.
fn sequence_of(key: &str, stamp: &str) -> Option<u64> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let stem = file_name.strip_suffix(LOG_EXTENSION)?;
    let rest = stem.strip_prefix(stamp)?;

    if rest.is_empty() {
        return Some(0);
    }

    let suffix = rest.strip_prefix('.')?;
    Some(suffix.parse().unwrap_or(0))
}

/// Key to archive the current object under, given the keys already present
/// in the directory. Keys for other days are ignored; an empty listing yields
/// sequence 1. A suffix of `u64::MAX` has no successor and is skipped.
pub fn next_archive_key<S: AsRef<str>>(
    directory: &str,
    date: NaiveDate,
    existing_keys: &[S],
) -> String {
    let stamp = date_stamp(date);
    let next = existing_keys
        .iter()
        .filter_map(|key| sequence_of(key.as_ref(), &stamp))
        .filter_map(|sequence| sequence.checked_add(1))
        .max()
        .unwrap_or(1);

    join(directory, &format!("{}.{}{}", stamp, next, LOG_EXTENSION))
}
