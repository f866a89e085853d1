//! Unquoted two-field CSV of hand-maintained corrections.

use tracing::debug;
use userdb_shared::User;

/// Parse `id,callsign` lines.
pub fn parse_fixed(lines: &[&str]) -> Vec<User> {
    lines
        .iter()
        .filter_map(|line| {
            let mut fields = line.split(',');
            match (fields.next(), fields.next()) {
                (Some(id), Some(callsign)) => Some(User::with_callsign(id, callsign)),
                _ => {
                    debug!(line, "skipping short fixed line");
                    None
                }
            }
        })
        .collect()
}
