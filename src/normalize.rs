//! Text normalization for analysis and display.
//!
//! `normalize` is total: any input (including empty) yields a string made of
//! alphanumerics, single spaces and the punctuation allowlist `. , ! ? $ % ( ) -`.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Punctuation kept by `normalize`; everything else non-alphanumeric is dropped.
pub const PUNCTUATION_ALLOWLIST: &[char] = &['.', ',', '!', '?', '$', '%', '(', ')', '-'];

/// Clean raw article text: whitespace (including vertical) becomes a space,
/// other control characters and disallowed characters are removed, whitespace
/// runs collapse, ends are trimmed.
pub fn normalize(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() {
                None
            } else if c.is_alphanumeric() || PUNCTUATION_ALLOWLIST.contains(&c) {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Same as [`normalize`] for optional input; `None` yields an empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Decode HTML entities and strip tags. Feed descriptions often carry markup.
pub fn strip_markup(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let decoded = html_escape::decode_html_entities(s);
    match RE_TAGS.get_or_try_init(|| Regex::new(r"(?is)</?[a-z][^>]*>")) {
        Ok(re) => re.replace_all(&decoded, " ").into_owned(),
        Err(_) => decoded.into_owned(),
    }
}

/// Title as shown to readers: parenthesis spacing tidied, then normalized.
pub fn display_title(title: &str) -> String {
    static RE_OPEN: OnceCell<Regex> = OnceCell::new();
    static RE_CLOSE: OnceCell<Regex> = OnceCell::new();

    let mut out = title.to_string();
    if let Ok(re) = RE_OPEN.get_or_try_init(|| Regex::new(r"\(\s*")) {
        out = re.replace_all(&out, " (").into_owned();
    }
    if let Ok(re) = RE_CLOSE.get_or_try_init(|| Regex::new(r"\s*\)")) {
        out = re.replace_all(&out, ") ").into_owned();
    }
    normalize(&out)
}
