//! Link-density spam heuristic
//!
//! Notes that attract traffic and consist largely of links are usually link
//! farms. Flagged notes still render; the caller just swaps in the ads
//! payload.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Note;

/// Notes with at most this many views are never flagged
pub const MIN_VIEWS: u64 = 100;

/// Percentage of link characters above which a note is flagged
pub const FRAUD_THRESHOLD: u64 = 7;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?|ftp)://[^\s]+").expect("valid link regex"));

/// Returns true when more than 7% of the note's characters are links
///
/// Only notes with more than 100 views are considered.
pub fn is_fraudulent(note: &Note) -> bool {
    if note.views <= MIN_VIEWS {
        return false;
    }

    let original = note.text.chars().count() as u64;
    if original == 0 {
        return false;
    }
    let stripped = LINK_RE.replace_all(&note.text, "").chars().count() as u64;
    let removed = original - stripped;

    // ceil(100 * removed / original) > threshold, in integer arithmetic
    100 * removed > FRAUD_THRESHOLD * original
}
