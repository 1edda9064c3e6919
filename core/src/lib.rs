//! Core components for signing Selling Partner API requests.
//!
//! This crate provides the foundational types shared by the spsign
//! ecosystem: a structured error type, cryptographic hashing helpers,
//! time formatting for the signing protocol, and [`SigningRequest`], the
//! decomposed view of an HTTP request that signers canonicalize.
//!
//! Service-specific signing logic lives in the service crates; this crate
//! holds only the plumbing they have in common.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod request;
pub use request::SigningRequest;
