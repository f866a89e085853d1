//! Per-node special ID lists discovered at runtime.

use userdb_shared::{User, parse_id};

/// Minimum number of comma-separated fields in a usable line.
const MIN_FIELDS: usize = 7;

/// Parse `id,callsign,name,_,_,_,country[,...]` lines.
///
/// Short lines and lines whose identifier does not parse are dropped, so a
/// special list can only ever add records.
pub fn parse_special(lines: &[&str]) -> Vec<User> {
    lines
        .iter()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < MIN_FIELDS || parse_id(fields[0]).is_none() {
                return None;
            }
            Some(User {
                id: fields[0].to_string(),
                callsign: fields[1].to_string(),
                name: fields[2].to_string(),
                country: fields[6].to_string(),
                ..User::default()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_fields_zero_to_two_and_six() {
        let users = parse_special(&["2501001,R1ABC,Ivan,x,y,z,Russia,extra"]);
        assert_eq!(users.len(), 1);
        let u = &users[0];
        assert_eq!(u.id, "2501001");
        assert_eq!(u.callsign, "R1ABC");
        assert_eq!(u.name, "Ivan");
        assert!(u.city.is_empty());
        assert!(u.state.is_empty());
        assert_eq!(u.country, "Russia");
    }

    #[test]
    fn short_and_unparseable_lines_are_dropped() {
        let users = parse_special(&[
            "ID,Call,Name,City,State,Nick,Country",
            "2501002,R1XYZ,Petr",
            "2501003,R1QRS,Olga,,,,Russia",
        ]);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "2501003");
    }
}
