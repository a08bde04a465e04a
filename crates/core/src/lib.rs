//! `userbase-core` — domain types for the user directory.
//!
//! This crate contains **pure domain** logic (no infrastructure concerns):
//! identifiers, the `User` record, and the validation rules that guard it.

pub mod error;
pub mod id;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use user::{User, UserFields, UserPatch};
