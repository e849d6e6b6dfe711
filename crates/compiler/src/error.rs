//! Compiler error model.

use netgate_cipher::CipherError;
use thiserror::Error;

/// A policy invariant was violated. Fatal to the whole compile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no segments declared")]
    NoSegments,

    #[error("segment declared with empty name")]
    EmptySegmentName,

    #[error("segment '{0}' declared multiple times")]
    DuplicateSegmentName(String),

    #[error("segment id {0} declared multiple times")]
    DuplicateSegmentId(u32),

    #[error("blacklist entry is empty")]
    EmptyBlacklistEntry,

    #[error("identity '{0}' does not meet naming requirements")]
    BadIdentityName(String),

    #[error("identity '{identity}' references undeclared segment '{segment}'")]
    UnknownSegment { identity: String, segment: String },

    #[error("identity '{0}' has no assigned addresses")]
    NoAddresses(String),

    #[error("identity '{identity}' has invalid address '{address}'")]
    InvalidAddress { identity: String, address: String },

    #[error("identity '{identity}' lists address '{address}' more than once")]
    DuplicateAddress { identity: String, address: String },

    #[error("identity '{identity}' credential rejected: {reason}")]
    CredentialPolicy { identity: String, reason: String },

    #[error("identity '{identity}' has invalid disablement date '{value}'")]
    InvalidDate { identity: String, value: String },

    #[error("identity '{0}' previously defined")]
    DuplicateIdentity(String),

    #[error("identity '{0}' duplicates another identity's credential")]
    DuplicateCredential(String),

    #[error("bypass address '{0}' previously defined")]
    DuplicateBypass(String),

    #[error("address '{0}' is both user-assigned and bypassed")]
    AddressAssignedAndBypassed(String),

    #[error("segment '{0}' is not referenced by any identity")]
    OrphanSegment(String),

    #[error("blacklist entry '{0}' duplicated")]
    DuplicateBlacklistEntry(String),

    #[error("blacklist entry '{0}' matches no known entity")]
    UnknownBlacklistEntry(String),

    #[error("credential encoding failed: {0}")]
    Cipher(#[from] CipherError),
}

/// Document emission failed. The prior document on disk is untouched.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("could not serialize policy document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write policy document: {0}")]
    Io(#[from] std::io::Error),
}
