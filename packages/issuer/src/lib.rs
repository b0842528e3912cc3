//! Signed token issuing
//!
//! This crate turns a claim set and a set of sign options into a signed
//! compact token:
//! - Registered claims from the options layered onto the caller's claims,
//!   with hard conflicts instead of silent overrides
//! - Issued-at handling (caller value, current time, or excluded)
//! - Header merging with caller overrides
//! - Keys available up front or delivered later through a future
//! - Pluggable signing primitive, with a compact JWS implementation included
//!
//! ```no_run
//! use cryypt_issuer::{sign, ClaimsBuilder, SignOptions};
//!
//! # async fn run() -> cryypt_issuer::IssuerResult<()> {
//! let claims = ClaimsBuilder::new().with_subject("u1").build();
//! let token = sign(&claims, SignOptions::new().with_key("secret")).await?;
//! println!("{token}");
//! # Ok(())
//! # }
//! ```

pub mod claims;
mod error;
pub mod issuer;
pub mod jws;
pub mod key;
pub mod options;
pub mod primitive;
mod types;

pub use claims::ClaimsBuilder;
pub use error::*;
pub use issuer::{sign, PendingIssue, TokenIssuer};
pub use jws::{Algorithm, CompactJws, JwsError};
pub use key::{KeyMaterial, KeySender, KeySource};
pub use options::{PayloadEncoding, RegisteredClaims, SignOptions};
pub use primitive::{SignRequest, SigningPrimitive};
pub use types::*;
