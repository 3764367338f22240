//! Infrastructure layer: SQLite storage for the user directory.

pub mod error;
pub mod mapper;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use store::UserStore;
