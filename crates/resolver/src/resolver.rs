//! Query engine: credential and segment resolution.

use tracing::{debug, warn};

use netgate_cipher::{self as cipher, KeyMaterial};
use netgate_core::{ConfigurationResult, HardwareAddr, PrincipalKey};

use crate::filter::FilteredPolicy;
use crate::log::{DecisionKind, DecisionLog};
use crate::store::PolicyStore;

/// How a resolved identity's credential is held.
enum Credential {
    /// Cipher token from the document; decrypted on demand.
    Token(String),
    /// Bypass-synthesized plaintext; never touches the cipher.
    Plaintext(String),
}

/// A transient identity assembled for one query.
struct ResolvedIdentity {
    macs: Vec<String>,
    credential: Credential,
}

/// Per-request query engine.
///
/// Holds no mutable state: the document is re-read per query and the
/// blacklist re-applied, so concurrent callers never contend and no
/// invalidation exists to race against.
pub struct Resolver {
    store: PolicyStore,
    key: KeyMaterial,
    log: DecisionLog,
}

impl Resolver {
    pub fn new(store: PolicyStore, key: KeyMaterial, log: DecisionLog) -> Self {
        Self { store, key, log }
    }

    /// The credential to match for `principal_key`, or `None` to deny.
    ///
    /// Bypass-synthesized identities return their plaintext as-is (the
    /// caller's supplied name must equal the password); real identities
    /// decrypt their stored token. Every failure path is a deny.
    pub fn resolve_credential(&self, principal_key: &str) -> Option<String> {
        let resolved = self
            .lookup(principal_key)
            .unwrap_or_else(|err| {
                warn!(%err, "credential query degraded to no-match");
                (None, None)
            })
            .0;
        let credential = resolved.and_then(|identity| match identity.credential {
            Credential::Plaintext(value) => Some(value),
            Credential::Token(token) => match cipher::decrypt(&token, &self.key) {
                Ok(plaintext) => Some(plaintext),
                Err(err) => {
                    warn!(%err, "stored credential undecryptable");
                    None
                }
            },
        });
        self.log
            .record(DecisionKind::Credential, principal_key, credential.is_some());
        credential
    }

    /// The segment id to assign for `principal_key` seen with
    /// `hardware_addrs`, or `None` to deny.
    ///
    /// Requires the identity and its segment to both survive filtering, and
    /// at least one supplied address to be in the identity's assigned set.
    pub fn resolve_segment(&self, principal_key: &str, hardware_addrs: &[String]) -> Option<String> {
        let (identity, segment) = self.lookup(principal_key).unwrap_or_else(|err| {
            warn!(%err, "segment query degraded to no-match");
            (None, None)
        });
        let assigned: Vec<String> = hardware_addrs
            .iter()
            .map(|a| HardwareAddr::normalize(a))
            .collect();
        let result = match (identity, segment) {
            (Some(identity), Some(segment))
                if identity.macs.iter().any(|m| assigned.contains(m)) =>
            {
                Some(segment)
            }
            _ => None,
        };
        self.log
            .record(DecisionKind::Segment, principal_key, result.is_some());
        result
    }

    /// One fresh read + filter + lookup pass.
    ///
    /// Identity and segment resolve independently: a credential query needs
    /// only the identity, segment assignment needs both.
    fn lookup(
        &self,
        input: &str,
    ) -> ConfigurationResult<(Option<ResolvedIdentity>, Option<String>)> {
        let doc = self.store.load()?;
        let filtered = FilteredPolicy::from_document(&doc);
        match PrincipalKey::parse(input) {
            PrincipalKey::Qualified { segment, principal } => {
                let key = format!("{segment}.{principal}");
                let identity = filtered.users.get(&key).map(|record| ResolvedIdentity {
                    macs: record.macs.iter().map(|m| m.as_str().to_string()).collect(),
                    credential: Credential::Token(record.pass.clone()),
                });
                let vlan = filtered.vlans.get(&segment).cloned();
                debug!(
                    key = %key,
                    identity = identity.is_some(),
                    segment = vlan.is_some(),
                    "qualified lookup"
                );
                Ok((identity, vlan))
            }
            PrincipalKey::Bare(token) => {
                // Lowercase only: a separator-formed name is not a bypass
                // candidate. Separator stripping applies to the supplied
                // hardware addresses, not the login name.
                let candidate = token.to_ascii_lowercase();
                if !HardwareAddr::is_valid(&candidate) {
                    return Ok((None, None));
                }
                let Some(segment_name) = filtered.bypass.get(&candidate) else {
                    return Ok((None, None));
                };
                let Some(vlan) = filtered.vlans.get(segment_name) else {
                    return Ok((None, None));
                };
                debug!(address = %candidate, segment = %segment_name, "bypass lookup");
                // Match-only identity: the raw input doubles as the password.
                let identity = ResolvedIdentity {
                    macs: vec![candidate],
                    credential: Credential::Plaintext(input.to_string()),
                };
                Ok((Some(identity), Some(vlan.clone())))
            }
        }
    }
}
