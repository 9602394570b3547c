use crate::error::{Result, RulekitError};
use crate::hash::ContentHash;
use crate::paths;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/catalog/"]
struct CatalogAssets;

/// A single upstream document: its path within the managed doc tree, the
/// shipped content, and the content hash.
#[derive(Debug, Clone)]
pub struct CatalogDoc {
    pub path: String,
    pub content: Vec<u8>,
    pub hash: ContentHash,
}

/// The immutable, versioned set of upstream documents.
///
/// `version` is a digest over the sorted `(path, hash)` pairs, so any content
/// change — in any document — produces a new catalog version.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    docs: Vec<CatalogDoc>,
}

impl Catalog {
    /// Load the catalog embedded in this binary at compile time.
    ///
    /// The embedded set is fully materialized before any sync logic runs;
    /// a partial catalog cannot reach the diff engine.
    pub fn embedded() -> Result<Self> {
        let mut docs = Vec::new();
        for path in CatalogAssets::iter() {
            let file = CatalogAssets::get(&path).ok_or_else(|| {
                RulekitError::CatalogUnavailable(format!("embedded document missing: {path}"))
            })?;
            docs.push((path.into_owned(), file.data.into_owned()));
        }
        Self::from_docs(docs)
    }

    /// Build a catalog from explicit `(path, content)` pairs.
    pub fn from_docs(docs: Vec<(String, Vec<u8>)>) -> Result<Self> {
        if docs.is_empty() {
            return Err(RulekitError::CatalogUnavailable(
                "no documents in catalog".to_string(),
            ));
        }
        let mut docs: Vec<CatalogDoc> = docs
            .into_iter()
            .map(|(path, content)| {
                paths::validate_doc_path(&path)?;
                let hash = ContentHash::of(&content);
                Ok(CatalogDoc {
                    path,
                    content,
                    hash,
                })
            })
            .collect::<Result<_>>()?;
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        for pair in docs.windows(2) {
            if pair[0].path == pair[1].path {
                return Err(RulekitError::CatalogUnavailable(format!(
                    "duplicate document path: {}",
                    pair[0].path
                )));
            }
        }
        let version = digest(&docs);
        Ok(Self { version, docs })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn docs(&self) -> &[CatalogDoc] {
        &self.docs
    }

    pub fn get(&self, path: &str) -> Option<&CatalogDoc> {
        self.docs.iter().find(|d| d.path == path)
    }
}

fn digest(docs: &[CatalogDoc]) -> String {
    let mut hasher = blake3::Hasher::new();
    for doc in docs {
        hasher.update(doc.path.as_bytes());
        hasher.update(&[0]);
        hasher.update(doc.hash.as_bytes());
    }
    hex::encode(&hasher.finalize().as_bytes()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(docs: &[(&str, &str)]) -> Vec<(String, Vec<u8>)> {
        docs.iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn embedded_catalog_is_nonempty_and_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.docs().is_empty());
        assert!(catalog
            .docs()
            .iter()
            .any(|d| d.path.starts_with("agent-rules/")));
    }

    #[test]
    fn version_changes_with_content() {
        let a = Catalog::from_docs(pairs(&[("rules/a.md", "one")])).unwrap();
        let b = Catalog::from_docs(pairs(&[("rules/a.md", "two")])).unwrap();
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn version_is_stable_across_input_order() {
        let a = Catalog::from_docs(pairs(&[("rules/a.md", "one"), ("rules/b.md", "two")])).unwrap();
        let b = Catalog::from_docs(pairs(&[("rules/b.md", "two"), ("rules/a.md", "one")])).unwrap();
        assert_eq!(a.version(), b.version());
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            Catalog::from_docs(Vec::new()),
            Err(RulekitError::CatalogUnavailable(_))
        ));
    }

    #[test]
    fn rejects_duplicate_paths() {
        let result = Catalog::from_docs(pairs(&[("rules/a.md", "one"), ("rules/a.md", "two")]));
        assert!(matches!(result, Err(RulekitError::CatalogUnavailable(_))));
    }

    #[test]
    fn rejects_escaping_paths() {
        let result = Catalog::from_docs(pairs(&[("../escape.md", "x")]));
        assert!(matches!(result, Err(RulekitError::InvalidDocPath(_))));
    }

    #[test]
    fn get_finds_documents() {
        let catalog = Catalog::from_docs(pairs(&[("rules/a.md", "one")])).unwrap();
        assert!(catalog.get("rules/a.md").is_some());
        assert!(catalog.get("rules/missing.md").is_none());
    }
}
