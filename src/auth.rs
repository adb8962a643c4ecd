//! Credential values, redacted secrets, and the identifiers that address them in storage.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
