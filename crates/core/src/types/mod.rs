//! Core types for Maison d'Assiettes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::PaymentKind;
pub use price::{Price, PriceError};
pub use role::Role;
pub use status::OrderStatus;
