//! EMV dCVV2 generation and verification for a simulated issuer host.
//!
//! The crate keeps issuer master keys in a policy-gated [`keystore`],
//! derives per-transaction session keys from card data and the
//! application transaction counter ([`derivation`]), and computes or
//! verifies the resulting three digit dynamic card verification value
//! ([`dcvv`]). The [`service`] module exposes the request/response
//! surface a host would present to an authorization system.

pub mod dcvv;
pub mod definitions;
pub mod derivation;
pub mod keystore;
pub mod service;

mod tdes;
