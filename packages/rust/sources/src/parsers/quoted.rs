//! Quoted six-field CSV (radioid.net, ham-digital.org).

use tracing::debug;
use userdb_shared::User;

/// Field separator between two quoted values.
const SEPARATOR: &str = r#"",""#;

/// Parse `"id","callsign","name","city","state","country"` lines.
pub fn parse_quoted(lines: &[&str]) -> Vec<User> {
    let mut users = Vec::with_capacity(lines.len());

    for line in lines {
        let inner = line.strip_prefix('"').unwrap_or(line);
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        let fields: Vec<&str> = inner.split(SEPARATOR).collect();
        if fields.len() < 6 {
            debug!(line, fields = fields.len(), "skipping short quoted line");
            continue;
        }

        users.push(User {
            id: fields[0].to_string(),
            callsign: fields[1].to_string(),
            name: fields[2].to_string(),
            city: fields[3].to_string(),
            state: fields[4].to_string(),
            country: fields[5].to_string(),
        });
    }

    users
}
