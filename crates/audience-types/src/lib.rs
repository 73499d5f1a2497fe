//! Shared types for the audience filter
//!
//! This crate holds every type that crosses the compiler boundary: the
//! merchant's filter selection coming in, the customer records fetched from
//! the Admin API, and the formatted results going back out.
//!
//! ## Flow
//!
//! ```text
//! FilterConfig ──► (compiler) ──► CandidateRecord* ──► FilteredResult*
//!    (caller)                       (Admin API)          (caller)
//! ```
//!
//! ## Rules
//!
//! 1. Wire names follow the Admin API / UI JSON (`camelCase`)
//! 2. Every upstream field is optional - the fetch only selects what active
//!    criteria need
//! 3. Malformed selections deserialize fine and read as "inactive"

pub mod filter;
pub mod record;
pub mod result;

pub use filter::*;
pub use record::*;
pub use result::*;
