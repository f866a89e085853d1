//! A registry endpoint together with its layout and failure policy.

use tracing::{debug, instrument, warn};
use url::Url;

use userdb_shared::{Result, SourcesConfig, User, UserDbError};

use crate::parsers::SourceKind;
use crate::retriever::{Retriever, split_lines};

/// One registry to fetch and parse.
#[derive(Debug, Clone)]
pub struct Source {
    /// Short name used in logs and error messages.
    pub name: String,
    pub url: Url,
    pub kind: SourceKind,
}

impl Source {
    pub fn new(name: impl Into<String>, url: Url, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url,
            kind,
        }
    }

    /// A dynamically discovered special registry.
    pub fn special(url: Url) -> Self {
        let name = url.host_str().unwrap_or("special").to_string();
        Self::new(name, url, SourceKind::Special)
    }

    /// The four fixed registries, in merge order.
    ///
    /// Later entries win field conflicts, so the hand-maintained fixes come
    /// first and the reflector list last.
    pub fn mandatory(sources: &SourcesConfig, min_quoted_lines: usize) -> Vec<Self> {
        let quoted = SourceKind::Quoted {
            min_lines: min_quoted_lines,
        };
        vec![
            Self::new("fixed", sources.fixed_url.clone(), SourceKind::Fixed),
            Self::new("hamdigital", sources.hamdigital_url.clone(), quoted),
            Self::new("radioid", sources.radioid_url.clone(), quoted),
            Self::new("reflector", sources.reflector_url.clone(), SourceKind::Reflector),
        ]
    }

    /// Fetch this registry and parse it into candidate records.
    ///
    /// Optional sources never fail: any error degrades to an empty result.
    #[instrument(skip_all, fields(source = %self.name, url = %self.url))]
    pub async fn fetch(&self, retriever: &Retriever) -> Result<Vec<User>> {
        match self.fetch_inner(retriever).await {
            Err(e) if self.kind.is_optional() => {
                warn!(error = %e, "ignoring special registry failure");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn fetch_inner(&self, retriever: &Retriever) -> Result<Vec<User>> {
        let text = retriever.get_text(&self.url).await?;
        let lines = split_lines(&text);

        if let Some(min) = self.kind.min_lines() {
            if lines.len() < min {
                return Err(UserDbError::TooFewEntries {
                    source_name: self.name.clone(),
                    url: self.url.to_string(),
                    count: lines.len(),
                    min,
                });
            }
        }

        let users = self.kind.parse(&lines);
        debug!(lines = lines.len(), users = users.len(), "registry parsed");
        Ok(users)
    }
}
