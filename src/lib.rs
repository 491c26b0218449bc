pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod engine;
pub mod favorites;
pub mod mcp;
pub mod render;
pub mod session;
pub mod tracking;

pub use concierge_core::{cart, models, pricing};
