//! Authentication primitives.
//!
//! Password hashing with Argon2id; verification of stored hashes.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
