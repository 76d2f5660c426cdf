//! The content registry: an immutable map from logical filenames to the
//! sha256 digest and remote location of each dataset artifact.
//!
//! The built-in manifest (`registry.txt`) is embedded at compile time. Each
//! line is `<filename> <hash> [<url>]`, whitespace separated; the hash may
//! carry a `sha256:` prefix. Entries without an explicit URL are resolved
//! against the registry's base URL.

use std::collections::BTreeMap;

use crate::error::GeoError;
use crate::transport::Transport;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryEntry {
    pub sha256: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    base_url: String,
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The registry shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new("");
        registry
            .load_manifest(include_str!("../registry.txt"))
            .expect("embedded registry.txt must be well formed");
        registry
    }

    pub fn load_manifest(&mut self, text: &str) -> Result<(), GeoError> {
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (name, hash) = match (fields.next(), fields.next()) {
                (Some(name), Some(hash)) => (name, hash),
                _ => {
                    return Err(GeoError::Manifest {
                        line: index + 1,
                        message: "expected `<filename> <hash> [<url>]`".to_string(),
                    });
                }
            };
            let url = fields.next().map(str::to_string);
            if fields.next().is_some() {
                return Err(GeoError::Manifest {
                    line: index + 1,
                    message: "trailing fields after url".to_string(),
                });
            }
            let digest = hash.strip_prefix("sha256:").unwrap_or(hash);
            if digest.len() != 64 || !digest.chars().all(|ch| ch.is_ascii_hexdigit()) {
                return Err(GeoError::Manifest {
                    line: index + 1,
                    message: format!("{hash:?} is not a sha256 digest"),
                });
            }
            self.entries.insert(
                name.to_string(),
                RegistryEntry {
                    sha256: digest.to_ascii_lowercase(),
                    url,
                },
            );
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&RegistryEntry, GeoError> {
        self.entries
            .get(name)
            .ok_or_else(|| GeoError::UnknownDataset(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn url_for(&self, name: &str) -> Result<String, GeoError> {
        let entry = self.lookup(name)?;
        match &entry.url {
            Some(url) => Ok(url.clone()),
            None => Ok(format!("{}{name}", self.base_url)),
        }
    }

    /// Remote existence probe without transferring the body. Backs
    /// `geodata check`; normal loads never call it.
    pub fn is_available<T: Transport>(&self, name: &str, transport: &T) -> Result<bool, GeoError> {
        let url = self.url_for(name)?;
        transport.probe(&url)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const DIGEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn parse_manifest_lines() {
        let mut registry = Registry::new("https://mirror.example/data/");
        registry
            .load_manifest(&format!(
                "# comment\n\nPREM_1s.csv sha256:{DIGEST}\nIASP91.csv {DIGEST} https://ds.example/IASP91.csv\n"
            ))
            .unwrap();
        assert_eq!(registry.lookup("PREM_1s.csv").unwrap().sha256, DIGEST);
        assert_eq!(
            registry.url_for("PREM_1s.csv").unwrap(),
            "https://mirror.example/data/PREM_1s.csv"
        );
        assert_eq!(
            registry.url_for("IASP91.csv").unwrap(),
            "https://ds.example/IASP91.csv"
        );
    }

    #[test]
    fn reject_short_digest() {
        let mut registry = Registry::new("");
        let err = registry.load_manifest("name.csv abc123\n").unwrap_err();
        assert_matches!(err, GeoError::Manifest { line: 1, .. });
    }

    #[test]
    fn reject_missing_hash() {
        let mut registry = Registry::new("");
        let err = registry.load_manifest("lonely-field\n").unwrap_err();
        assert_matches!(err, GeoError::Manifest { line: 1, .. });
    }

    #[test]
    fn unknown_dataset() {
        let registry = Registry::new("");
        let err = registry.lookup("nope.csv").unwrap_err();
        assert_matches!(err, GeoError::UnknownDataset(_));
    }

    #[test]
    fn builtin_registry_loads() {
        let registry = Registry::builtin();
        assert!(registry.contains("PREM_1s.csv"));
        assert!(registry.names().count() > 10);
    }
}
