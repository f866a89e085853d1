//! Special-registry discovery.
//!
//! Besides the four fixed registries, a directory endpoint lists nodes that
//! each publish a small "special IDs" file. Discovery resolves that directory
//! into one URL per node. It must finish before any fetch job is dispatched,
//! and any failure here aborts the run.

mod parser;

use tracing::{info, instrument};
use url::Url;

use userdb_shared::{Result, SpecialNode, SourcesConfig};
use userdb_sources::Retriever;

/// Fetch the directory and return its nodes.
#[instrument(skip_all, fields(url = %directory_url))]
pub async fn fetch_nodes(retriever: &Retriever, directory_url: &Url) -> Result<Vec<SpecialNode>> {
    let body = retriever.get_bytes(directory_url).await?;
    parser::parse_directory(directory_url, &body)
}

/// Resolve the configured directory into per-node special list URLs.
pub async fn discover(retriever: &Retriever, sources: &SourcesConfig) -> Result<Vec<Url>> {
    let nodes = fetch_nodes(retriever, &sources.special_directory_url).await?;
    let urls = parser::node_urls(&nodes, &sources.special_path);

    info!(nodes = nodes.len(), urls = urls.len(), "special registries discovered");
    Ok(urls)
}
