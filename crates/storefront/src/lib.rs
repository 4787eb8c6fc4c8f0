//! Maison d'Assiettes storefront library.
//!
//! The application core behind the storefront UI: page routing, session and
//! profile lifecycle, cart/favorites/checkout state, and admin operations,
//! all backed by typed clients for the hosted backend and the payment proxy.
//! The UI layer renders [`router::View`] values and forwards user intent to
//! [`app::App`]; nothing in this crate draws anything.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod backend;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod payments;
pub mod router;
pub mod session;
