//! Line parsers, one per registry layout.
//!
//! Every parser is a pure function from the lines of a registry body to
//! candidate [`User`] records. Malformed lines are skipped here; identifier
//! validation happens at merge time (special registries excepted).

mod fixed;
mod quoted;
mod reflector;
mod special;

use userdb_shared::User;

pub use fixed::parse_fixed;
pub use quoted::parse_quoted;
pub use reflector::parse_reflector;
pub use special::parse_special;

/// Layout of a registry body, which also decides its failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `id,callsign` without quotes.
    Fixed,
    /// `"id","callsign","name","city","state","country"` with a minimum line count.
    Quoted { min_lines: usize },
    /// Header line, then `id@callsign@...`.
    Reflector,
    /// Unquoted CSV with at least seven fields; failures are tolerated.
    Special,
}

impl SourceKind {
    /// Parse registry lines according to this layout.
    pub fn parse(&self, lines: &[&str]) -> Vec<User> {
        match self {
            Self::Fixed => parse_fixed(lines),
            Self::Quoted { .. } => parse_quoted(lines),
            Self::Reflector => parse_reflector(lines),
            Self::Special => parse_special(lines),
        }
    }

    /// Whether a failure on this source may be absorbed.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Special)
    }

    /// Minimum number of lines the body must contain, if any.
    pub fn min_lines(&self) -> Option<usize> {
        match self {
            Self::Quoted { min_lines } => Some(*min_lines),
            _ => None,
        }
    }
}
