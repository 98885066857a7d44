//! Authentication primitives.
//!
//! Password hashing with Argon2id. Token issuance and validation live
//! in `curafin-shared` next to the rest of the request-facing auth types.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
