//! Live blacklist filtering.
//!
//! Filtering is applied fresh on every query, never pre-compiled away: the
//! compiler keeps blacklisted entities in the document and the resolver
//! excludes them here, so un-blacklisting is a document swap with no
//! recompile of the affected identities.

use std::collections::BTreeMap;

use netgate_core::{IdentityRecord, PolicyDocument};

/// The document after one pass of blacklist exclusion.
#[derive(Debug, Clone)]
pub struct FilteredPolicy {
    pub users: BTreeMap<String, IdentityRecord>,
    pub vlans: BTreeMap<String, String>,
    pub bypass: BTreeMap<String, String>,
}

fn banned(token: &str, blacklist: &[String]) -> bool {
    blacklist.iter().any(|b| b == token)
}

/// A `users` entry survives only if its full key, every `.`-component of the
/// key, every assigned address, and every attribute are off the blacklist.
fn user_survives(key: &str, record: &IdentityRecord, blacklist: &[String]) -> bool {
    if banned(key, blacklist) {
        return false;
    }
    if key.split('.').any(|part| banned(part, blacklist)) {
        return false;
    }
    if record.macs.iter().any(|m| banned(m.as_str(), blacklist)) {
        return false;
    }
    !record.attr.iter().any(|a| banned(a, blacklist))
}

impl FilteredPolicy {
    pub fn from_document(doc: &PolicyDocument) -> Self {
        let blacklist = &doc.blacklist;
        let users = doc
            .users
            .iter()
            .filter(|(key, record)| user_survives(key, record, blacklist))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let vlans = doc
            .vlans
            .iter()
            .filter(|(name, _)| !banned(name, blacklist))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let bypass = doc
            .bypass
            .iter()
            .filter(|(addr, segment)| !banned(addr, blacklist) && !banned(segment, blacklist))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { users, vlans, bypass }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netgate_core::HardwareAddr;

    fn record(macs: &[&str], attrs: &[&str]) -> IdentityRecord {
        IdentityRecord {
            macs: macs.iter().map(|m| HardwareAddr::parse(m).unwrap()).collect(),
            pass: "token".to_string(),
            attr: attrs.iter().map(|a| a.to_string()).collect(),
            port: Vec::new(),
        }
    }

    fn document(blacklist: &[&str]) -> PolicyDocument {
        let mut doc = PolicyDocument {
            blacklist: blacklist.iter().map(|b| b.to_string()).collect(),
            ..PolicyDocument::default()
        };
        doc.users.insert(
            "sales.alice".to_string(),
            record(&["aabbccddeeff"], &["wired"]),
        );
        doc.vlans.insert("sales".to_string(), "10".to_string());
        doc.vlans.insert("guest".to_string(), "20".to_string());
        doc.bypass
            .insert("001122334455".to_string(), "guest".to_string());
        doc
    }

    #[test]
    fn empty_blacklist_keeps_everything() {
        let filtered = FilteredPolicy::from_document(&document(&[]));
        assert_eq!(filtered.users.len(), 1);
        assert_eq!(filtered.vlans.len(), 2);
        assert_eq!(filtered.bypass.len(), 1);
    }

    #[test]
    fn principal_component_excludes_user() {
        let filtered = FilteredPolicy::from_document(&document(&["alice"]));
        assert!(filtered.users.is_empty());
        assert_eq!(filtered.vlans.len(), 2);
    }

    #[test]
    fn segment_component_excludes_user_and_segment() {
        let filtered = FilteredPolicy::from_document(&document(&["sales"]));
        assert!(filtered.users.is_empty());
        assert!(!filtered.vlans.contains_key("sales"));
        assert!(filtered.vlans.contains_key("guest"));
    }

    #[test]
    fn full_key_excludes_user() {
        let filtered = FilteredPolicy::from_document(&document(&["sales.alice"]));
        assert!(filtered.users.is_empty());
    }

    #[test]
    fn address_excludes_user() {
        let filtered = FilteredPolicy::from_document(&document(&["aabbccddeeff"]));
        assert!(filtered.users.is_empty());
    }

    #[test]
    fn attribute_excludes_user() {
        let filtered = FilteredPolicy::from_document(&document(&["wired"]));
        assert!(filtered.users.is_empty());
    }

    #[test]
    fn bypass_is_excluded_by_address_or_mapped_segment() {
        let by_addr = FilteredPolicy::from_document(&document(&["001122334455"]));
        assert!(by_addr.bypass.is_empty());

        let by_segment = FilteredPolicy::from_document(&document(&["guest"]));
        assert!(by_segment.bypass.is_empty());
    }
}
