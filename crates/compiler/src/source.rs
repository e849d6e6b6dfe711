//! Declaration sources.
//!
//! Sources are registered explicitly: each implements the capability trait
//! for what it declares (segments, blacklist entries, identities) and the
//! compiler iterates a statically assembled [`SourceRegistry`]. Registration
//! order is load order.

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// A network segment declaration: unique name, unique numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDecl {
    pub name: String,
    pub id: u32,
}

impl SegmentDecl {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self { name: name.into(), id }
    }
}

/// One identity declaration, prior to validation and credential encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityDecl {
    /// Principal name; combined with `segment` into the `segment.name` key.
    pub name: String,

    /// Segment this identity is assigned to on success.
    pub segment: String,

    /// Plaintext credential; encoded by the compiler, never emitted as-is.
    pub password: String,

    /// Assigned hardware addresses (12 lowercase hex each).
    pub macs: Vec<String>,

    /// Addresses granted segment access with no identity lookup.
    pub bypass: Vec<String>,

    /// Addresses exempt from credential matching on their port.
    pub port_bypass: Vec<String>,

    /// Free-form attributes carried through to the document.
    pub attrs: Vec<String>,

    /// Per-address disablement: address → `YYYY-MM-DD` expiry. Past-due
    /// addresses are removed from the bypass and assigned sets at compile
    /// time.
    pub disable: BTreeMap<String, String>,

    /// Whole-identity expiry; a past date drops the identity from emission.
    pub expires: Option<NaiveDate>,

    /// Shares a credential with another identity; exempt from the
    /// credential-uniqueness check only.
    pub inherits: bool,

    /// Policy-only identity: contributes bypass entries and global state but
    /// never authenticates, so no `users` entry is emitted.
    pub no_login: bool,
}

/// Declares network segments.
pub trait SegmentSource {
    fn segments(&self) -> Vec<SegmentDecl>;
}

/// Declares blacklist tokens.
pub trait BlacklistSource {
    fn entries(&self) -> Vec<String>;
}

/// Declares identities.
pub trait IdentitySource {
    fn identities(&self) -> Vec<IdentityDecl>;
}

impl SegmentSource for Vec<SegmentDecl> {
    fn segments(&self) -> Vec<SegmentDecl> {
        self.clone()
    }
}

impl BlacklistSource for Vec<String> {
    fn entries(&self) -> Vec<String> {
        self.clone()
    }
}

impl IdentitySource for Vec<IdentityDecl> {
    fn identities(&self) -> Vec<IdentityDecl> {
        self.clone()
    }
}

/// Shared post-processing applied to every identity before validation,
/// e.g. site-wide password normalization.
pub trait IdentityHook {
    fn ready(&self, decl: IdentityDecl) -> IdentityDecl;
}

/// Statically assembled list of declaration sources.
#[derive(Default)]
pub struct SourceRegistry {
    segments: Vec<Box<dyn SegmentSource>>,
    blacklists: Vec<Box<dyn BlacklistSource>>,
    identities: Vec<Box<dyn IdentitySource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_segments(mut self, source: impl SegmentSource + 'static) -> Self {
        self.segments.push(Box::new(source));
        self
    }

    pub fn register_blacklist(mut self, source: impl BlacklistSource + 'static) -> Self {
        self.blacklists.push(Box::new(source));
        self
    }

    pub fn register_identities(mut self, source: impl IdentitySource + 'static) -> Self {
        self.identities.push(Box::new(source));
        self
    }

    pub(crate) fn segment_sources(&self) -> &[Box<dyn SegmentSource>] {
        &self.segments
    }

    pub(crate) fn blacklist_sources(&self) -> &[Box<dyn BlacklistSource>] {
        &self.blacklists
    }

    pub(crate) fn identity_sources(&self) -> &[Box<dyn IdentitySource>] {
        &self.identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_registration_order() {
        let registry = SourceRegistry::new()
            .register_segments(vec![SegmentDecl::new("sales", 10)])
            .register_segments(vec![SegmentDecl::new("guest", 20)]);
        let loaded: Vec<_> = registry
            .segment_sources()
            .iter()
            .flat_map(|s| s.segments())
            .collect();
        assert_eq!(loaded[0].name, "sales");
        assert_eq!(loaded[1].name, "guest");
    }
}
