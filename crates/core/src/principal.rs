//! Principal key parsing.

/// A parsed login key.
///
/// A key containing a `.` is a qualified `segment.principal` lookup; anything
/// else is treated as a bare token and routed to the hardware-address bypass
/// path. Windows supplicants prepend `DOMAIN\` to the user name; that prefix
/// is stripped before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalKey {
    /// `segment.principal` — split on the first `.`.
    Qualified { segment: String, principal: String },
    /// Anything without a segment delimiter; candidate bypass address.
    Bare(String),
}

const DOMAIN_SLASH: char = '\\';
const SEGMENT_DELIMITER: char = '.';

/// Strip a leading `DOMAIN\` qualifier, if any.
pub fn strip_domain(input: &str) -> &str {
    match input.find(DOMAIN_SLASH) {
        Some(idx) => &input[idx + DOMAIN_SLASH.len_utf8()..],
        None => input,
    }
}

impl PrincipalKey {
    pub fn parse(input: &str) -> Self {
        let name = strip_domain(input);
        match name.split_once(SEGMENT_DELIMITER) {
            Some((segment, principal)) => Self::Qualified {
                segment: segment.to_string(),
                principal: principal.to_string(),
            },
            None => Self::Bare(name.to_string()),
        }
    }

    /// The full `segment.principal` key, for qualified lookups.
    pub fn qualified_key(&self) -> Option<String> {
        match self {
            Self::Qualified { segment, principal } => Some(format!("{segment}.{principal}")),
            Self::Bare(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_splits_on_first_dot() {
        let key = PrincipalKey::parse("sales.alice");
        assert_eq!(
            key,
            PrincipalKey::Qualified {
                segment: "sales".to_string(),
                principal: "alice".to_string(),
            }
        );
        assert_eq!(key.qualified_key().unwrap(), "sales.alice");
    }

    #[test]
    fn bare_token_has_no_qualified_key() {
        let key = PrincipalKey::parse("001122334455");
        assert_eq!(key, PrincipalKey::Bare("001122334455".to_string()));
        assert!(key.qualified_key().is_none());
    }

    #[test]
    fn domain_prefix_is_stripped() {
        assert_eq!(
            PrincipalKey::parse("CORP\\sales.alice"),
            PrincipalKey::parse("sales.alice")
        );
        assert_eq!(strip_domain("CORP\\bob"), "bob");
        assert_eq!(strip_domain("bob"), "bob");
    }
}
