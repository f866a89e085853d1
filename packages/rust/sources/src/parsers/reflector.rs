//! `@`-delimited reflector list with a header line.

use tracing::debug;
use userdb_shared::User;

/// Parse the reflector list, skipping its first (header) line.
///
/// The first two `@` of each line act as field separators.
pub fn parse_reflector(lines: &[&str]) -> Vec<User> {
    lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let line = line.replacen('@', ",", 2);
            let mut fields = line.split(',');
            match (fields.next(), fields.next()) {
                (Some(id), Some(callsign)) => Some(User::with_callsign(id, callsign)),
                _ => {
                    debug!(%line, "skipping short reflector line");
                    None
                }
            }
        })
        .collect()
}
