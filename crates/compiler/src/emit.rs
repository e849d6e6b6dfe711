//! All-or-nothing document emission.

use std::fs;
use std::path::Path;

use tracing::info;

use netgate_core::PolicyDocument;

use crate::error::EmitError;

/// Serialize `doc` deterministically and write it to `path`.
///
/// The document is serialized in full before anything touches the
/// filesystem, then written to a temporary sibling and renamed into place,
/// so a valid prior document is never replaced by a partial one.
pub fn write_document(doc: &PolicyDocument, path: &Path) -> Result<(), EmitError> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), bytes = json.len(), "policy document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netgate_core::IdentityRecord;

    fn sample() -> PolicyDocument {
        let mut doc = PolicyDocument::default();
        doc.vlans.insert("sales".to_string(), "10".to_string());
        doc.users.insert(
            "sales.alice".to_string(),
            IdentityRecord {
                macs: vec!["aabbccddeeff".parse().unwrap()],
                pass: "1.2|3.4".to_string(),
                attr: Vec::new(),
                port: Vec::new(),
            },
        );
        doc
    }

    #[test]
    fn written_document_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        let doc = sample();
        write_document(&doc, &path).unwrap();
        let back: PolicyDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn emission_replaces_an_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(&path, "{}").unwrap();
        write_document(&sample(), &path).unwrap();
        let back: PolicyDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn no_temporary_file_is_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        write_document(&sample(), &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }
}
