//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT generation and validation.
//! - [`cookies`] -- The split-token session cookies and `Cookie` header parsing.

pub mod cookies;
pub mod jwt;
pub mod password;
