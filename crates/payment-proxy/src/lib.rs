//! Maison d'Assiettes payment proxy library.
//!
//! The storefront never holds the card processor's secret key. Instead it
//! calls this service, which signs the upstream requests and returns only the
//! fields the storefront needs (client secrets, customer ids, saved-card
//! summaries). Exposed as a library so the router can be driven in-process
//! by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod stripe;
