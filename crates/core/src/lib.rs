//! Maison d'Assiettes Core - Shared domain types.
//!
//! This crate provides the common vocabulary used across all Maison
//! components:
//! - `storefront` - The marketplace application core (routing, cart, checkout)
//! - `payment-proxy` - Thin REST proxy in front of the payment processor
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles,
//!   and order statuses
//! - [`catalog`] - The fixed tag vocabulary for listed plates (types, origins,
//!   eras, materials)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
