//! Domain core for the food ordering concierge.
//!
//! Everything in this crate is pure: no I/O, no async. The remote ordering
//! API owns restaurants, menus and orders; this crate only describes their
//! shapes, keeps the session cart, and prices it.

pub mod cart;
pub mod models;
pub mod pricing;

pub use cart::{Cart, MAX_QUANTITY};
pub use pricing::{format_usd, Totals, TAX_RATE};
