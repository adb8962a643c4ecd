//! Public extension contracts for using coordinator-issued credentials.
//!
//! [`RequestSignerExt`] stays generic over the request and error types so callers can attach
//! credentials to any HTTP client. [`BearerSigner`] covers the common case of an
//! `http::Request` (and, with the `reqwest` feature, a `reqwest::RequestBuilder`).

pub mod request_signer;

pub use request_signer::*;
