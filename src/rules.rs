//! Referential-integrity rules
//!
//! State changes that touch more than one entity, or gate on what other
//! entities reference, live here as `Registry` methods grouped by concern.
//! Each rule checks all its preconditions before mutating anything, so a
//! returned error always means the store is unchanged.

pub mod center;
pub mod donation;
pub mod family;
pub mod user;

pub use family::FamilyDeletion;
