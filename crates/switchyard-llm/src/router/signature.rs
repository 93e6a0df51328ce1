use regex::Regex;
use std::sync::LazyLock;

/// Length of a task signature in hex characters.
pub const SIGNATURE_LEN: usize = 12;

static RE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\.(py|js|ts|tsx|sh|md|json|yaml|yml)\b").unwrap());
static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Normalize a task so that near-identical requests compare equal.
///
/// Lower-cases, folds `name.ext` (for a fixed set of extensions) into
/// `FILE.ext`, folds digit runs into `N` and collapses whitespace.
pub fn normalize_task(task: &str) -> String {
    let lower = task.to_lowercase();
    let files = RE_FILENAME.replace_all(&lower, "FILE.${1}");
    let digits = RE_DIGITS.replace_all(&files, "N");
    digits.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deduplication key for a task: 12 hex chars of the normalized text's hash.
pub fn task_signature(task: &str) -> String {
    let hash = blake3::hash(normalize_task(task).as_bytes());
    hash.to_hex().as_str()[..SIGNATURE_LEN].to_string()
}
