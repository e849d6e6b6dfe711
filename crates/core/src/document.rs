//! The compiled policy document — the unit of deployment.
//!
//! The document is immutable once written. The compiler is its only producer
//! and the resolver re-reads it fresh on every query, so there is no cache to
//! invalidate. Maps are `BTreeMap` so serialization is deterministic with
//! stable key ordering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::addr::HardwareAddr;

/// One identity entry in the `users` map, keyed by `segment.principal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Hardware addresses assigned to this identity.
    pub macs: Vec<HardwareAddr>,

    /// Encoded credential (cipher token). Bypass-synthesized transient
    /// identities hold plaintext here at runtime; those are never serialized.
    pub pass: String,

    /// Free-form attributes, opaque to this engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attr: Vec<String>,

    /// Addresses exempt from credential matching on their switch port.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port: Vec<HardwareAddr>,
}

impl IdentityRecord {
    /// Whether any of `candidates` is in this identity's assigned set.
    pub fn matches_any(&self, candidates: &[String]) -> bool {
        candidates
            .iter()
            .any(|c| self.macs.iter().any(|m| m.as_str() == c))
    }
}

/// The compiled aggregate: identities, segments, blacklist, bypass mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// `segment.principal` → identity record.
    pub users: BTreeMap<String, IdentityRecord>,

    /// Segment name → numeric id, kept as a string on the wire.
    pub vlans: BTreeMap<String, String>,

    /// Flat deny-list of opaque tokens, filtered live at every query.
    pub blacklist: Vec<String>,

    /// Hardware address → segment name; grants a segment with no identity.
    pub bypass: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(macs: &[&str]) -> IdentityRecord {
        IdentityRecord {
            macs: macs.iter().map(|m| HardwareAddr::parse(m).unwrap()).collect(),
            pass: "token".to_string(),
            attr: Vec::new(),
            port: Vec::new(),
        }
    }

    #[test]
    fn matches_any_finds_assigned_address() {
        let rec = record(&["aabbccddeeff", "001122334455"]);
        assert!(rec.matches_any(&["001122334455".to_string()]));
        assert!(!rec.matches_any(&["ffeeddccbbaa".to_string()]));
        assert!(!rec.matches_any(&[]));
    }

    #[test]
    fn document_round_trips_with_wire_field_names() {
        let mut doc = PolicyDocument::default();
        doc.users.insert("sales.alice".to_string(), record(&["aabbccddeeff"]));
        doc.vlans.insert("sales".to_string(), "10".to_string());
        doc.blacklist.push("denied".to_string());
        doc.bypass
            .insert("001122334455".to_string(), "guest".to_string());

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"users\""));
        assert!(json.contains("\"macs\""));
        assert!(json.contains("\"pass\""));
        let back: PolicyDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let json = r#"{
            "users": {"net.bob": {"macs": ["aabbccddeeff"], "pass": "x"}},
            "vlans": {"net": "42"},
            "blacklist": [],
            "bypass": {}
        }"#;
        let doc: PolicyDocument = serde_json::from_str(json).unwrap();
        let rec = &doc.users["net.bob"];
        assert!(rec.attr.is_empty());
        assert!(rec.port.is_empty());
    }
}
