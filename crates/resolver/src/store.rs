//! Fresh-per-query document access.

use std::fs;
use std::path::{Path, PathBuf};

use netgate_cipher::KeyMaterial;
use netgate_core::{ConfigurationError, ConfigurationResult, PolicyDocument};

/// Handle to the deployed policy document.
///
/// Deliberately holds no parsed state: every [`PolicyStore::load`] re-reads
/// and re-parses the file, so concurrent readers never contend and a swapped
/// document is picked up by the very next query.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ConfigurationResult<PolicyDocument> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Read one line of key material from `path`.
pub fn load_key_material(path: &Path) -> ConfigurationResult<KeyMaterial> {
    let raw = fs::read_to_string(path)?;
    KeyMaterial::parse(&raw).map_err(|e| ConfigurationError::key_unavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_round_trips_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(
            &path,
            r#"{"users":{},"vlans":{"sales":"10"},"blacklist":[],"bypass":{}}"#,
        )
        .unwrap();
        let doc = PolicyStore::new(&path).load().unwrap();
        assert_eq!(doc.vlans["sales"], "10");
    }

    #[test]
    fn missing_document_is_unreadable() {
        let store = PolicyStore::new("/nonexistent/network.json");
        assert!(matches!(
            store.load().unwrap_err(),
            ConfigurationError::Unreadable(_)
        ));
    }

    #[test]
    fn malformed_document_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PolicyStore::new(&path).load().unwrap_err(),
            ConfigurationError::Malformed(_)
        ));
    }

    #[test]
    fn key_material_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyfile");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "4:0123456789abcdef").unwrap();
        let key = load_key_material(&path).unwrap();
        assert_eq!(key.padding(), 4);
    }

    #[test]
    fn bad_key_material_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyfile");
        fs::write(&path, "no marker here..").unwrap();
        assert!(matches!(
            load_key_material(&path).unwrap_err(),
            ConfigurationError::KeyUnavailable(_)
        ));
    }
}
