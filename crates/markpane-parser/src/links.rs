//! Link normalization and validation for URLs taken from directive labels.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::OnceLock;

const UNSAFE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

fn bad_protocol() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(vbscript|javascript|file|data):").unwrap())
}

fn good_data() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^data:image/(gif|png|jpeg|webp);").unwrap())
}

/// Percent-encode characters that must not appear raw in an attribute URL.
///
/// Existing `%XX` escapes are left as they are.
pub fn normalize_link(url: &str) -> String {
    utf8_percent_encode(url.trim(), UNSAFE).to_string()
}

/// Reject script and local-file protocols.
///
/// `data:` is allowed only for the raster image types browsers render inline.
pub fn validate_link(url: &str) -> bool {
    let url = url.trim();
    if bad_protocol().is_match(url) {
        return good_data().is_match(url);
    }
    true
}
