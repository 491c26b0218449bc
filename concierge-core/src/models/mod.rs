//! Domain models for the food ordering concierge.
//!
//! # Ownership
//!
//! - [`Restaurant`], [`MenuItem`] and [`Order`] are snapshots fetched from the
//!   remote ordering API. They are never mutated locally; an order only
//!   changes by fetching a fresh copy.
//! - [`CartLine`] is owned by the active conversation and changes only
//!   through [`crate::Cart`].

mod menu;
mod order;
mod restaurant;

pub use menu::*;
pub use order::*;
pub use restaurant::*;
