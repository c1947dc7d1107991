//! Folder-reference resolution.
//!
//! Users paste folder references in several shapes: a full Drive URL
//! (`https://drive.google.com/drive/folders/<id>`), a legacy URL carrying an
//! `id=` query parameter, or the bare identifier. This module extracts the
//! canonical folder ID from any of them.
//!
//! Drive identifiers are opaque tokens of 25+ characters from the
//! `[A-Za-z0-9_-]` alphabet. The length gate is what distinguishes an ID from
//! ordinary path words; anything shorter is rejected even if it were a real
//! (hypothetical) identifier.

/// Characters that can appear in a Drive folder or file identifier.
fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_'
}

/// Minimum length of a Drive identifier token.
const MIN_TOKEN_LEN: usize = 25;

/// Extract a canonical folder ID from a user-supplied folder reference.
///
/// Patterns are tried in strict priority order, first match wins:
///
/// 1. a `/folders/<token>` path segment
/// 2. an `id=<token>` parameter (matched anywhere, so `folderid=<token>`
///    also qualifies at its embedded `id=`)
/// 3. any standalone run of 25+ token characters
///
/// Returns `None` for empty input or when no pattern matches. The returned
/// slice borrows from `input` and is always a maximal token run.
///
/// # Example
///
/// ```
/// use gdrive_proxy::gallery::extract_folder_id;
///
/// let url = "https://drive.google.com/drive/folders/1AbCdEfGhIjKlMnOpQrStUvWxYz12345?usp=sharing";
/// assert_eq!(extract_folder_id(url), Some("1AbCdEfGhIjKlMnOpQrStUvWxYz12345"));
/// ```
pub fn extract_folder_id(input: &str) -> Option<&str> {
    if input.is_empty() {
        return None;
    }

    token_after_marker(input, "/folders/")
        .or_else(|| token_after_marker(input, "id="))
        .or_else(|| first_bare_token(input))
}

/// Find the first occurrence of `marker` that is followed by a qualifying
/// token, scanning past occurrences whose trailing run is too short.
fn token_after_marker<'a>(input: &'a str, marker: &str) -> Option<&'a str> {
    let mut haystack = input;
    let mut base = 0;

    while let Some(pos) = haystack.find(marker) {
        let start = base + pos + marker.len();
        let token = token_run_at(input, start);
        if token.len() >= MIN_TOKEN_LEN {
            return Some(token);
        }
        // Resume just past this marker occurrence
        base += pos + marker.len();
        haystack = &input[base..];
    }

    None
}

/// Find the leftmost maximal token run of qualifying length.
fn first_bare_token(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if is_token_char(bytes[i]) {
            let token = token_run_at(input, i);
            if token.len() >= MIN_TOKEN_LEN {
                return Some(token);
            }
            i += token.len();
        } else {
            i += 1;
        }
    }

    None
}

/// The maximal run of token characters starting at byte offset `start`.
fn token_run_at(input: &str, start: usize) -> &str {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_token_char(bytes[end]) {
        end += 1;
    }
    &input[start..end]
}

// =============================================================================
// Tests
// =============================================================================
