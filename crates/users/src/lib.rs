//! User directory domain module.
//!
//! Identity records and the rules applied to them before they reach storage
//! (no IO, no HTTP, no storage).

pub mod user;

pub use user::{NewUser, User, UserPatch, validate_email};
