//! # cnorm-core: Foundational Types for Codified Norms
//!
//! The leaf crate of the workspace. Everything that the policy algebra and
//! the repository agree on lives here:
//!
//! 1. **`CanonicalBytes` newtype.** Every document identity is a digest over
//!    canonical bytes. No raw `serde_json::to_vec()` feeds a digest.
//!
//! 2. **Identity newtypes.** `Target`, `Param`, `Namespace` and `DocumentId`
//!    are distinct types; a param name cannot be passed where a document
//!    identity is expected.
//!
//! 3. **The value domain.** `Value` (scalar or the `Any`/`None` markers) and
//!    `Values`, an immutable set with union, intersection and difference in
//!    which the universal set absorbs every operation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cnorm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{DocumentId, Namespace, Param, Target};
pub use temporal::Timestamp;
pub use value::{Value, Values, ALL_VALUES, NO_VALUES};
