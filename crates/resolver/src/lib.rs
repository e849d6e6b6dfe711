//! `netgate-resolver` — per-request policy queries.
//!
//! Answers two questions for the surrounding authentication server: which
//! credential to match for a principal, and which network segment to assign
//! given the hardware addresses seen on the request. The policy document is
//! opened and parsed fresh on every query and the blacklist is applied live,
//! so configuration updates take effect on the next query with no
//! invalidation step.
//!
//! Queries are stateless and idempotent; nothing here locks for reads. Any
//! internal failure — missing document, malformed JSON, cipher error —
//! degrades to a deny (`None`). No error crosses this boundary.

pub mod filter;
pub mod log;
pub mod resolver;
pub mod store;

pub use log::{DecisionKind, DecisionLog, DecisionSink, FileSink, MemorySink, NullSink};
pub use resolver::Resolver;
pub use store::{PolicyStore, load_key_material};
