//! Text cleanup for merged user records.
//!
//! Radios display a restricted character set and the output files are comma
//! delimited, so every text field goes through the same passes:
//! 1. Transliterate to ASCII (characters without a mapping are dropped)
//! 2. Trim surrounding whitespace
//! 3. Collapse runs of spaces
//! 4. Replace commas with semicolons
//!
//! All passes are total and the result is a fixed point: normalizing twice
//! gives the same text as normalizing once.

mod translit;

use std::sync::LazyLock;

use regex::Regex;

use userdb_shared::User;

pub use translit::{asciify, transliterate};

/// Normalize every text field of `user`. The identifier is left untouched.
pub fn normalize_user(user: &mut User) {
    for field in [
        &mut user.callsign,
        &mut user.name,
        &mut user.city,
        &mut user.state,
        &mut user.country,
    ] {
        *field = normalize_string(field);
    }
}

/// Run the full cleanup pipeline on one field.
pub fn normalize_string(s: &str) -> String {
    let result = asciify(s);
    let result = collapse_spaces(result.trim());
    result.replace(',', ";")
}

/// Collapse runs of two or more spaces into one.
fn collapse_spaces(s: &str) -> String {
    static MULTI_SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));

    MULTI_SPACE_RE.replace_all(s, " ").into_owned()
}
