//! Core domain types for the merged user database.

use serde::{Deserialize, Deserializer};

/// Largest identifier a radio can store (24-bit DMR ID).
pub const MAX_USER_ID: u32 = 0x00FF_FFFF;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// One subscriber identity as published by a registry.
///
/// `id` is kept as text until the merge step; every other field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    /// Numeric radio ID, possibly with a leading `#` before merging.
    pub id: String,
    pub callsign: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl User {
    /// Build a record carrying only an identifier and a callsign.
    pub fn with_callsign(id: impl Into<String>, callsign: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            callsign: callsign.into(),
            ..Self::default()
        }
    }

    /// Copy every non-empty text field of `other` over this record.
    ///
    /// Empty fields in `other` never erase data, and `id` is left alone.
    pub fn overlay(&mut self, other: User) {
        let User {
            id: _,
            callsign,
            name,
            city,
            state,
            country,
        } = other;

        for (slot, value) in [
            (&mut self.callsign, callsign),
            (&mut self.name, name),
            (&mut self.city, city),
            (&mut self.state, state),
            (&mut self.country, country),
        ] {
            if !value.is_empty() {
                *slot = value;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Identifier parsing
// ---------------------------------------------------------------------------

/// Strip a single leading `#` from a raw identifier.
pub fn canonical_id(raw: &str) -> &str {
    raw.strip_prefix('#').unwrap_or(raw)
}

/// Parse a raw identifier into its 24-bit numeric value.
///
/// Accepts an optional leading `#` followed by ASCII digits only.
pub fn parse_id(raw: &str) -> Option<u32> {
    let digits = canonical_id(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u32>().ok().filter(|id| *id <= MAX_USER_ID)
}

// ---------------------------------------------------------------------------
// SpecialNode
// ---------------------------------------------------------------------------

/// One entry of the special-registry directory.
///
/// Only `address` is needed to reach the node; the other fields are
/// informational and accept any scalar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecialNode {
    #[serde(default, alias = "ID", alias = "Id", deserialize_with = "scalar_text")]
    pub id: String,
    #[serde(default, alias = "Country", deserialize_with = "scalar_text")]
    pub country: String,
    #[serde(alias = "Address")]
    pub address: String,
}

/// Read a string, number, boolean or null as text.
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Signed(n)) => n.to_string(),
        Some(Scalar::Unsigned(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}
