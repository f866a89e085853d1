//! Identifier-keyed merge with field-level overlay.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use userdb_shared::{Result, User, UserDbError, canonical_id, parse_id};

/// Merge records by numeric identifier and return them sorted ascending.
///
/// Records are applied in input order: the first occurrence of an identifier
/// is inserted as-is, later ones overwrite only their non-empty fields.
/// Records with an empty identifier are skipped; any other identifier that
/// does not parse aborts the merge.
pub fn merge_and_sort(users: Vec<User>) -> Result<Vec<User>> {
    let total = users.len();
    let mut by_id: BTreeMap<u32, User> = BTreeMap::new();

    for mut user in users {
        if user.id.is_empty() {
            continue;
        }

        let id = parse_id(&user.id).ok_or_else(|| UserDbError::InvalidId {
            id: user.id.clone(),
        })?;

        match by_id.entry(id) {
            Entry::Vacant(slot) => {
                let canonical = canonical_id(&user.id).to_string();
                user.id = canonical;
                slot.insert(user);
            }
            Entry::Occupied(mut slot) => slot.get_mut().overlay(user),
        }
    }

    debug!(input = total, merged = by_id.len(), "records merged");
    Ok(by_id.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, callsign: &str, name: &str, country: &str) -> User {
        User {
            id: id.into(),
            callsign: callsign.into(),
            name: name.into(),
            country: country.into(),
            ..User::default()
        }
    }

    #[test]
    fn later_non_empty_fields_win() {
        let merged = merge_and_sort(vec![
            user("3100001", "OLD", "Old Name", "USA"),
            user("3100001", "NEW", "", ""),
        ])
        .unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].callsign, "NEW");
        assert_eq!(merged[0].name, "Old Name");
        assert_eq!(merged[0].country, "USA");
    }

    #[test]
    fn hash_prefix_is_stripped_and_merged() {
        let merged = merge_and_sort(vec![
            user("#3100001", "A", "", ""),
            user("3100001", "", "Name", ""),
        ])
        .unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "3100001");
        assert_eq!(merged[0].callsign, "A");
        assert_eq!(merged[0].name, "Name");
    }

    #[test]
    fn output_is_strictly_ascending_by_numeric_id() {
        let merged = merge_and_sort(vec![
            user("900", "C", "", ""),
            user("10000", "E", "", ""),
            user("99", "B", "", ""),
            user("900", "D", "", ""),
            user("5", "A", "", ""),
            user("#99", "", "", ""),
        ])
        .unwrap();

        let ids: Vec<u32> = merged.iter().map(|u| u.id.parse().unwrap()).collect();
        assert_eq!(ids, vec![5, 99, 900, 10000]);
        assert_eq!(merged[2].callsign, "D");
    }

    #[test]
    fn empty_identifiers_are_skipped() {
        let merged = merge_and_sort(vec![user("", "GHOST", "", ""), user("7", "REAL", "", "")])
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].callsign, "REAL");
    }

    #[test]
    fn unparseable_identifier_is_fatal() {
        let err = merge_and_sort(vec![user("7", "OK", "", ""), user("Radio ID", "", "", "")])
            .unwrap_err();
        match err {
            UserDbError::InvalidId { id } => assert_eq!(id, "Radio ID"),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn identifier_above_24_bits_is_fatal() {
        let err = merge_and_sort(vec![user("16777216", "BIG", "", "")]).unwrap_err();
        assert!(matches!(err, UserDbError::InvalidId { .. }));
    }
}
