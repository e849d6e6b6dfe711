//! `netgate-compiler` — build-time policy compilation.
//!
//! Consumes independently authored segment, blacklist, and identity
//! declarations from an explicit [`SourceRegistry`], cross-validates them,
//! encodes credentials through the cipher, and emits one canonical
//! [`PolicyDocument`](netgate_core::PolicyDocument). Any invariant violation
//! aborts the whole compile; nothing is ever partially applied and a valid
//! prior document is never overwritten by an invalid one.
//!
//! Single-shot and non-concurrent: the operator serializes invocations
//! against the same output path.

pub mod compile;
pub mod emit;
pub mod error;
pub mod source;

pub use compile::Compiler;
pub use emit::write_document;
pub use error::{EmitError, ValidationError};
pub use source::{
    BlacklistSource, IdentityDecl, IdentityHook, IdentitySource, SegmentDecl, SegmentSource,
    SourceRegistry,
};
