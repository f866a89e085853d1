//! Special-registry directory parser.
//!
//! The directory is a JSON array of `{"id", "country", "address"}` objects.
//! Each address names a host serving a special ID list under a fixed path.

use tracing::warn;
use url::Url;

use userdb_shared::{Result, SpecialNode, UserDbError};

/// Decode the directory body into node descriptors.
pub(crate) fn parse_directory(directory_url: &Url, body: &[u8]) -> Result<Vec<SpecialNode>> {
    serde_json::from_slice(body).map_err(|e| UserDbError::decode(directory_url.as_str(), e.to_string()))
}

/// Build `http://<address>/<path>` for every node, in directory order.
///
/// Nodes whose address does not form a valid URL are skipped.
pub(crate) fn node_urls(nodes: &[SpecialNode], special_path: &str) -> Vec<Url> {
    let special_path = special_path.trim_start_matches('/');

    nodes
        .iter()
        .filter_map(|node| {
            let address = node.address.trim();
            if address.is_empty() {
                warn!(id = %node.id, "special node has no address");
                return None;
            }
            match Url::parse(&format!("http://{address}/{special_path}")) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(id = %node.id, address, error = %e, "skipping special node with bad address");
                    None
                }
            }
        })
        .collect()
}
