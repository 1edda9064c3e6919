//! Selling Partner API SigV4 signer.
//!
//! Signs outgoing Selling Partner API requests with AWS Signature
//! Version 4: the request is canonicalized, a scoped signing key is
//! derived from the caller's credentials, and the resulting signature is
//! written into the `Authorization` header.
//!
//! Signing is an explicit value transform: [`Signer::sign`] consumes a
//! request and returns a new one with the derived headers merged, so a
//! shared request template is never aliased.
//!
//! ```no_run
//! use spsign_sp_api::{Credential, Signer};
//!
//! # fn main() -> spsign_core::Result<()> {
//! let credential = Credential {
//!     access_key_id: "AKIDEXAMPLE".to_string(),
//!     secret_access_key: "secret".to_string(),
//!     region: "us-east-1".to_string(),
//!     session_token: None,
//! };
//! let signer = Signer::new(credential)?;
//!
//! let req = http::Request::builder()
//!     .method("GET")
//!     .uri("https://sellingpartnerapi.amazon.com/orders/v0/orders?MarketplaceIds=ATVPDKIKX0DER")
//!     .body(Vec::<u8>::new())
//!     .expect("request must be valid");
//! let signed = signer.sign(req)?;
//! # let _ = signed;
//! # Ok(())
//! # }
//! ```

mod canonical;
pub use canonical::Canonicalize;
pub use canonical::RequestCanonicalizer;

mod credential;
pub use credential::Credential;

mod signer;
pub use signer::Signer;

mod constants;
