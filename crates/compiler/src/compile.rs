//! The compilation pass: load, validate, encode, aggregate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Utc};
use tracing::info;

use netgate_cipher::{self as cipher, KeyMaterial};
use netgate_core::{HardwareAddr, IdentityRecord, PolicyDocument};

use crate::error::ValidationError;
use crate::source::{IdentityDecl, IdentityHook, SourceRegistry};

/// Minimum credential length; credentials are alphanumeric only.
const MIN_CREDENTIAL_LEN: usize = 32;

/// Cross-validating policy compiler.
///
/// `today` is injected so disablement/expiry resolution is deterministic
/// under test; production callers use [`Compiler::new`], which pins it to the
/// current UTC date.
pub struct Compiler<'a> {
    registry: &'a SourceRegistry,
    hook: Option<&'a dyn IdentityHook>,
    key: KeyMaterial,
    today: NaiveDate,
}

/// State accumulated across identities for the global invariant checks.
#[derive(Default)]
struct CompileState {
    passwords: BTreeSet<String>,
    assigned: BTreeSet<String>,
    bypassed: BTreeSet<String>,
    referenced_segments: BTreeSet<String>,
    principal_names: BTreeSet<String>,
    qualified_keys: BTreeSet<String>,
    attrs: BTreeSet<String>,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a SourceRegistry, key: KeyMaterial) -> Self {
        Self {
            registry,
            hook: None,
            key,
            today: Utc::now().date_naive(),
        }
    }

    /// Install the shared identity post-processing hook.
    pub fn with_hook(mut self, hook: &'a dyn IdentityHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Override the date used to resolve disablement and expiry.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run the whole compile. Any invariant violation aborts with no output.
    pub fn compile(&self) -> Result<PolicyDocument, ValidationError> {
        let vlans = self.load_segments()?;
        let blacklist = self.load_blacklist()?;

        let mut state = CompileState::default();
        let mut users = BTreeMap::new();
        let mut bypass = BTreeMap::new();
        for source in self.registry.identity_sources() {
            for decl in source.identities() {
                self.process_identity(decl, &vlans, &mut state, &mut users, &mut bypass)?;
            }
        }

        state.verify(&vlans, &blacklist)?;
        info!(
            users = users.len(),
            segments = vlans.len(),
            bypass = bypass.len(),
            "policy compiled"
        );
        Ok(PolicyDocument {
            users,
            vlans,
            blacklist,
            bypass,
        })
    }

    fn load_segments(&self) -> Result<BTreeMap<String, String>, ValidationError> {
        let mut vlans = BTreeMap::new();
        let mut ids = BTreeSet::new();
        for source in self.registry.segment_sources() {
            for decl in source.segments() {
                if decl.name.is_empty() {
                    return Err(ValidationError::EmptySegmentName);
                }
                if !ids.insert(decl.id) {
                    return Err(ValidationError::DuplicateSegmentId(decl.id));
                }
                if vlans.insert(decl.name.clone(), decl.id.to_string()).is_some() {
                    return Err(ValidationError::DuplicateSegmentName(decl.name));
                }
            }
        }
        if vlans.is_empty() {
            return Err(ValidationError::NoSegments);
        }
        info!(count = vlans.len(), "loaded segments");
        Ok(vlans)
    }

    fn load_blacklist(&self) -> Result<Vec<String>, ValidationError> {
        let mut blacklist = Vec::new();
        for source in self.registry.blacklist_sources() {
            for entry in source.entries() {
                if entry.is_empty() {
                    return Err(ValidationError::EmptyBlacklistEntry);
                }
                blacklist.push(entry);
            }
        }
        info!(count = blacklist.len(), "loaded blacklist");
        Ok(blacklist)
    }

    fn process_identity(
        &self,
        decl: IdentityDecl,
        vlans: &BTreeMap<String, String>,
        state: &mut CompileState,
        users: &mut BTreeMap<String, IdentityRecord>,
        bypass_map: &mut BTreeMap<String, String>,
    ) -> Result<(), ValidationError> {
        let decl = match self.hook {
            Some(hook) => hook.ready(decl),
            None => decl,
        };

        if decl.name.is_empty() || !decl.name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::BadIdentityName(decl.name));
        }
        if !vlans.contains_key(&decl.segment) {
            return Err(ValidationError::UnknownSegment {
                identity: decl.name,
                segment: decl.segment,
            });
        }
        let qualified = format!("{}.{}", decl.segment, decl.name);
        info!(identity = %qualified, "composing identity");

        // Segment-reference accounting happens before the expiry skip: an
        // expired identity still anchors its segment.
        state.referenced_segments.insert(decl.segment.clone());
        state.principal_names.insert(decl.name.clone());
        if !state.qualified_keys.insert(qualified.clone()) {
            return Err(ValidationError::DuplicateIdentity(qualified));
        }

        self.check_addresses(&qualified, &decl)?;
        self.check_credential(&qualified, &decl.password)?;

        // Per-address disablement: past-due addresses leave the bypass set
        // first, then the assigned set, always both.
        let mut macs = decl.macs.clone();
        let mut bypass = decl.bypass.clone();
        for (addr, value) in &decl.disable {
            let date = parse_disable_date(value).ok_or_else(|| ValidationError::InvalidDate {
                identity: qualified.clone(),
                value: value.clone(),
            })?;
            if date < self.today {
                info!(identity = %qualified, address = %addr, "address time-disabled");
                bypass.retain(|m| m != addr);
                macs.retain(|m| m != addr);
            }
        }

        if let Some(expiry) = decl.expires {
            if expiry < self.today {
                info!(identity = %qualified, %expiry, "identity expired, omitting");
                return Ok(());
            }
        }

        if !decl.inherits && !state.passwords.insert(decl.password.clone()) {
            return Err(ValidationError::DuplicateCredential(qualified));
        }
        state.assigned.extend(macs.iter().cloned());
        for addr in &bypass {
            if !state.bypassed.insert(addr.clone()) {
                return Err(ValidationError::DuplicateBypass(addr.clone()));
            }
            bypass_map.insert(addr.clone(), decl.segment.clone());
        }
        state.attrs.extend(decl.attrs.iter().cloned());

        if decl.no_login {
            return Ok(());
        }

        let token = cipher::encrypt(&decl.password, &self.key)?;
        macs.sort();
        let mut attrs = decl.attrs;
        attrs.sort();
        let mut port = decl.port_bypass;
        port.sort();
        users.insert(
            qualified.clone(),
            IdentityRecord {
                macs: to_addrs(&qualified, &macs)?,
                pass: token,
                attr: attrs,
                port: to_addrs(&qualified, &port)?,
            },
        );
        Ok(())
    }

    fn check_addresses(&self, identity: &str, decl: &IdentityDecl) -> Result<(), ValidationError> {
        if decl.macs.is_empty() {
            return Err(ValidationError::NoAddresses(identity.to_string()));
        }
        let mut seen = BTreeSet::new();
        for mac in &decl.macs {
            if !HardwareAddr::is_valid(mac) {
                return Err(ValidationError::InvalidAddress {
                    identity: identity.to_string(),
                    address: mac.clone(),
                });
            }
            if !seen.insert(mac.clone()) {
                return Err(ValidationError::DuplicateAddress {
                    identity: identity.to_string(),
                    address: mac.clone(),
                });
            }
        }
        for mac in decl.bypass.iter().chain(&decl.port_bypass) {
            if !HardwareAddr::is_valid(mac) {
                return Err(ValidationError::InvalidAddress {
                    identity: identity.to_string(),
                    address: mac.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_credential(&self, identity: &str, password: &str) -> Result<(), ValidationError> {
        if password.len() < MIN_CREDENTIAL_LEN {
            return Err(ValidationError::CredentialPolicy {
                identity: identity.to_string(),
                reason: format!("shorter than {MIN_CREDENTIAL_LEN} characters"),
            });
        }
        if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::CredentialPolicy {
                identity: identity.to_string(),
                reason: "only alphanumerics supported".to_string(),
            });
        }
        Ok(())
    }
}

impl CompileState {
    fn verify(
        &self,
        vlans: &BTreeMap<String, String>,
        blacklist: &[String],
    ) -> Result<(), ValidationError> {
        if let Some(addr) = self.assigned.intersection(&self.bypassed).next() {
            return Err(ValidationError::AddressAssignedAndBypassed(addr.clone()));
        }
        for name in vlans.keys() {
            if !self.referenced_segments.contains(name) {
                return Err(ValidationError::OrphanSegment(name.clone()));
            }
        }
        let mut seen = BTreeSet::new();
        for entry in blacklist {
            if !seen.insert(entry) {
                return Err(ValidationError::DuplicateBlacklistEntry(entry.clone()));
            }
            let known = self.principal_names.contains(entry)
                || self.qualified_keys.contains(entry)
                || self.assigned.contains(entry)
                || self.bypassed.contains(entry)
                || self.referenced_segments.contains(entry)
                || self.attrs.contains(entry);
            if !known {
                return Err(ValidationError::UnknownBlacklistEntry(entry.clone()));
            }
        }
        Ok(())
    }
}

fn parse_disable_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

fn to_addrs(identity: &str, macs: &[String]) -> Result<Vec<HardwareAddr>, ValidationError> {
    macs.iter()
        .map(|m| {
            HardwareAddr::parse(m).map_err(|_| ValidationError::InvalidAddress {
                identity: identity.to_string(),
                address: m.clone(),
            })
        })
        .collect()
}
