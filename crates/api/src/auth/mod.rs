//! Authentication primitives for the identity collaborator.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 access-token generation and validation.

pub mod jwt;
pub mod password;
