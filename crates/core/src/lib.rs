//! `userbase-core` — domain foundation for the user directory.
//!
//! This crate contains **pure domain** types and rules (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod user;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use user::{Address, Geo, User, UserDetails};
pub use validation::{FieldError, UserPayload, ValidationErrors};
