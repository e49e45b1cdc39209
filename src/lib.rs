//! webstore - spec-faithful Web Storage semantics for non-browser hosts
//!
//! Origin-scoped, insertion-ordered string maps ("storage areas") partitioned
//! by storage class (local/session), with mutation notifications broadcast to
//! sibling areas sharing the same class and origin.

pub mod broadcast;
pub mod facade;
pub mod host;
pub mod observability;
pub mod origin;
pub mod storage;
